/* src/cli/core/src/build/bundler/mod.rs */

// Uniform interface over the rollup and webpack backends. Both produce the
// same three compiler handles; per-backend behaviour hangs off `BundlerKind`.

mod compiler;
mod inject;
mod result;
mod rollup;
mod webpack;


use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use super::error::BuildError;
use super::target::BuildTarget;

use compiler::Stage;

pub use compiler::Compiler;
pub use inject::{css_placeholder, inject_resources};
pub use result::CompileResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundlerKind {
  Rollup,
  Webpack,
}

impl FromStr for BundlerKind {
  type Err = BuildError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "rollup" => Ok(Self::Rollup),
      "webpack" => Ok(Self::Webpack),
      other => Err(BuildError::UnsupportedBundler(other.to_string())),
    }
  }
}

impl fmt::Display for BundlerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl BundlerKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Rollup => "rollup",
      Self::Webpack => "webpack",
    }
  }

  /// Validate an explicit choice, or infer one from the config files in `cwd`.
  pub fn resolve(requested: Option<&str>, cwd: &Path) -> Result<Self, BuildError> {
    match requested {
      Some(name) => name.parse(),
      None if cwd.join("rollup.config.js").exists() => Ok(Self::Rollup),
      None if cwd.join("webpack.config.js").exists() => Ok(Self::Webpack),
      None => Err(BuildError::BundlerNotFound(cwd.to_path_buf())),
    }
  }

  pub fn supports_legacy(self) -> bool {
    matches!(self, Self::Rollup)
  }

  /// Whether per-component CSS is substituted into emitted bundles after compiling.
  pub fn injects_resources(self) -> bool {
    matches!(self, Self::Rollup)
  }

  /// Both defaults select the stage: rollup passes `--configStage` through to the
  /// config's `commandLineArgs`, webpack picks the named config.
  pub fn default_command(self, stage: Stage) -> String {
    match self {
      Self::Rollup => format!("npx rollup -c --configStage {}", stage.as_str()),
      Self::Webpack => format!("npx webpack --config-name {} --json", stage.as_str()),
    }
  }
}

/// Construction-time switches for a set of compilers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerMode {
  pub dev: bool,
  pub legacy: bool,
}

impl CompilerMode {
  pub fn production() -> Self {
    Self::default()
  }

  pub fn legacy() -> Self {
    Self { dev: false, legacy: true }
  }
}

/// Per-stage command overrides; `None` falls back to the backend default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageCommands {
  pub client: Option<String>,
  pub server: Option<String>,
  pub serviceworker: Option<String>,
}

impl StageCommands {
  fn get(&self, stage: Stage) -> Option<&str> {
    match stage {
      Stage::Client => self.client.as_deref(),
      Stage::Server => self.server.as_deref(),
      Stage::ServiceWorker => self.serviceworker.as_deref(),
    }
  }
}

pub struct Compilers {
  pub client: Compiler,
  pub server: Compiler,
  pub serviceworker: Option<Compiler>,
}

/// Instantiate the client, server and optional service-worker compilers for `target`.
pub fn create_compilers(kind: BundlerKind, target: &BuildTarget, mode: CompilerMode) -> Compilers {
  let make = |stage: Stage| {
    let command = target
      .commands
      .get(stage)
      .map_or_else(|| kind.default_command(stage), str::to_string);
    Compiler::new(kind, stage, mode, command, target)
  };

  Compilers {
    client: make(Stage::Client),
    server: make(Stage::Server),
    serviceworker: has_serviceworker(target).then(|| make(Stage::ServiceWorker)),
  }
}

/// A service worker is built when the project has an entry for it or a command is configured.
pub fn has_serviceworker(target: &BuildTarget) -> bool {
  target.commands.serviceworker.is_some()
    || ["service-worker.js", "service-worker.ts"].iter().any(|f| target.src.join(f).is_file())
}
