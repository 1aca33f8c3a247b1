/* src/cli/core/src/build/bundler/compiler.rs */

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use super::result::CompileResult;
use super::{BundlerKind, CompilerMode, rollup, webpack};
use crate::build::error::BuildError;
use crate::build::target::BuildTarget;
use crate::shell::capture_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Client,
  Server,
  ServiceWorker,
}

impl Stage {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Client => "client",
      Self::Server => "server",
      Self::ServiceWorker => "serviceworker",
    }
  }

  /// Directory the stage emits into, relative to which chunk files are reported.
  pub fn output_dir(self, dest: &Path) -> PathBuf {
    match self {
      Self::Client => dest.join("client"),
      Self::Server => dest.join("server"),
      Self::ServiceWorker => dest.to_path_buf(),
    }
  }

  /// Subdirectories of `output_dir` owned by other stages.
  pub fn foreign_dirs(self) -> &'static [&'static str] {
    match self {
      Self::ServiceWorker => &["client", "server"],
      Self::Client | Self::Server => &[],
    }
  }
}

/// One bundler invocation, bound to a stage and a directory set.
#[derive(Debug)]
pub struct Compiler {
  kind: BundlerKind,
  stage: Stage,
  mode: CompilerMode,
  command: String,
  cwd: PathBuf,
  output_dir: PathBuf,
  env: Vec<(&'static str, String)>,
}

impl Compiler {
  pub(super) fn new(
    kind: BundlerKind,
    stage: Stage,
    mode: CompilerMode,
    command: String,
    target: &BuildTarget,
  ) -> Self {
    let node_env = if mode.dev { "development" } else { "production" };
    let mut env = vec![
      ("BURROW_STAGE", stage.as_str().to_string()),
      ("BURROW_SRC", target.src.display().to_string()),
      ("BURROW_ROUTES", target.routes.display().to_string()),
      ("BURROW_OUTPUT", target.output.display().to_string()),
      ("BURROW_DEST", target.dest.display().to_string()),
      ("NODE_ENV", node_env.to_string()),
    ];
    if mode.legacy && stage == Stage::Client {
      env.push(("BURROW_LEGACY_BUILD", "true".to_string()));
    }

    Self {
      kind,
      stage,
      mode,
      command,
      cwd: target.cwd.clone(),
      output_dir: stage.output_dir(&target.dest),
      env,
    }
  }

  /// Label used in progress events and compile errors.
  pub fn tag(&self) -> &'static str {
    match self.stage {
      Stage::Client if self.mode.legacy => "client (legacy)",
      stage => stage.as_str(),
    }
  }

  pub async fn compile(&self) -> Result<CompileResult> {
    let started = Instant::now();
    let before = match self.kind {
      BundlerKind::Rollup => Some(rollup::snapshot(&self.output_dir, self.stage.foreign_dirs())?),
      BundlerKind::Webpack => None,
    };

    let output = capture_command(&self.cwd, &self.command, self.tag(), &self.env).await?;
    if !output.status.success() {
      return Err(
        BuildError::Compile {
          stage: self.tag(),
          bundler: self.kind,
          messages: vec![output.failure_message(self.kind.as_str())],
        }
        .into(),
      );
    }

    let mut result = match before {
      Some(before) => rollup::collect(
        self.kind,
        self.tag(),
        &self.output_dir,
        self.stage.foreign_dirs(),
        &before,
        &output.stderr,
      )?,
      None => webpack::parse_stats(self.kind, self.tag(), &output.stdout)?,
    };
    result.duration = started.elapsed();
    Ok(result)
  }
}
