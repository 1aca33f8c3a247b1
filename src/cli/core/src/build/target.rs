/* src/cli/core/src/build/target.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::bundler::{BundlerKind, StageCommands};
use super::error::BuildError;
use crate::config::BurrowConfig;

pub const DEFAULT_SRC: &str = "src";
pub const DEFAULT_ROUTES: &str = "src/routes";
pub const DEFAULT_OUTPUT: &str = "src/node_modules/@burrow";
pub const DEFAULT_STATIC: &str = "static";
pub const DEFAULT_DEST: &str = "__burrow__/build";

/// Invocation parameters for one build. Relative paths resolve against `cwd`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub cwd: PathBuf,
  pub src: Option<PathBuf>,
  pub routes: Option<PathBuf>,
  pub output: Option<PathBuf>,
  pub static_dir: Option<PathBuf>,
  pub dest: Option<PathBuf>,
  pub bundler: Option<String>,
  pub legacy: bool,
  pub ext: Option<String>,
  pub commands: StageCommands,
}

impl BuildOptions {
  pub fn new(cwd: impl Into<PathBuf>) -> Self {
    Self { cwd: cwd.into(), ..Self::default() }
  }

  /// Options seeded from `burrow.toml`; callers layer CLI flags on top.
  pub fn from_config(cwd: impl Into<PathBuf>, config: &BurrowConfig) -> Self {
    let build = &config.build;
    Self {
      src: build.src.as_ref().map(PathBuf::from),
      routes: build.routes.as_ref().map(PathBuf::from),
      output: build.output.as_ref().map(PathBuf::from),
      static_dir: build.static_dir.as_ref().map(PathBuf::from),
      dest: build.dest.as_ref().map(PathBuf::from),
      bundler: build.bundler.clone(),
      legacy: build.legacy.unwrap_or(false),
      ext: build.ext.clone(),
      commands: StageCommands {
        client: config.bundler.client_command.clone(),
        server: config.bundler.server_command.clone(),
        serviceworker: config.bundler.serviceworker_command.clone(),
      },
      ..Self::new(cwd)
    }
  }
}

impl BuildOptions {
  /// Absolute `(output, dest)` without validating the rest of the options.
  pub fn output_dirs(&self) -> Result<(PathBuf, PathBuf)> {
    let cwd = std::path::absolute(&self.cwd)
      .with_context(|| format!("failed to resolve {}", self.cwd.display()))?;
    Ok((
      resolve_dir(&cwd, self.output.as_deref(), DEFAULT_OUTPUT),
      resolve_dir(&cwd, self.dest.as_deref(), DEFAULT_DEST),
    ))
  }
}

/// Fully resolved build inputs: every directory is absolute and the bundler is known.
#[derive(Debug, Clone)]
pub struct BuildTarget {
  pub cwd: PathBuf,
  pub src: PathBuf,
  pub routes: PathBuf,
  pub output: PathBuf,
  pub static_dir: PathBuf,
  pub dest: PathBuf,
  pub bundler: BundlerKind,
  pub legacy: bool,
  pub ext: Option<String>,
  pub commands: StageCommands,
}

impl BuildTarget {
  /// Validate and resolve `opts`. Touches nothing on disk, so every
  /// configuration error surfaces before the output area is reset.
  pub fn resolve(opts: &BuildOptions) -> Result<Self> {
    let cwd = std::path::absolute(&opts.cwd)
      .with_context(|| format!("failed to resolve {}", opts.cwd.display()))?;
    let bundler = BundlerKind::resolve(opts.bundler.as_deref(), &cwd)?;
    if opts.legacy && !bundler.supports_legacy() {
      return Err(BuildError::LegacyUnsupported(bundler).into());
    }

    let dir = |value: &Option<PathBuf>, default: &str| resolve_dir(&cwd, value.as_deref(), default);
    Ok(Self {
      src: dir(&opts.src, DEFAULT_SRC),
      routes: dir(&opts.routes, DEFAULT_ROUTES),
      output: dir(&opts.output, DEFAULT_OUTPUT),
      static_dir: dir(&opts.static_dir, DEFAULT_STATIC),
      dest: dir(&opts.dest, DEFAULT_DEST),
      bundler,
      legacy: opts.legacy,
      ext: opts.ext.clone(),
      commands: opts.commands.clone(),
      cwd,
    })
  }
}

fn resolve_dir(cwd: &Path, value: Option<&Path>, default: &str) -> PathBuf {
  let path = value.unwrap_or_else(|| Path::new(default));
  if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_resolve_under_cwd() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = BuildOptions::new(tmp.path());
    opts.bundler = Some("rollup".into());
    let target = BuildTarget::resolve(&opts).unwrap();
    assert_eq!(target.src, tmp.path().join("src"));
    assert_eq!(target.routes, tmp.path().join("src/routes"));
    assert_eq!(target.output, tmp.path().join("src/node_modules/@burrow"));
    assert_eq!(target.static_dir, tmp.path().join("static"));
    assert_eq!(target.dest, tmp.path().join("__burrow__/build"));
    assert!(target.dest.is_absolute());
  }

  #[test]
  fn bundler_inferred_from_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("webpack.config.js"), "").unwrap();
    let target = BuildTarget::resolve(&BuildOptions::new(tmp.path())).unwrap();
    assert_eq!(target.bundler, BundlerKind::Webpack);

    std::fs::write(tmp.path().join("rollup.config.js"), "").unwrap();
    let target = BuildTarget::resolve(&BuildOptions::new(tmp.path())).unwrap();
    assert_eq!(target.bundler, BundlerKind::Rollup);
  }

  #[test]
  fn missing_bundler_config_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = BuildTarget::resolve(&BuildOptions::new(tmp.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<BuildError>(), Some(BuildError::BundlerNotFound(_))));
  }

  #[test]
  fn unknown_bundler_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = BuildOptions::new(tmp.path());
    opts.bundler = Some("parcel".into());
    let err = BuildTarget::resolve(&opts).unwrap_err();
    assert!(err.to_string().contains("'parcel' is not a valid option for --bundler"));
  }

  #[test]
  fn webpack_legacy_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = BuildOptions::new(tmp.path());
    opts.bundler = Some("webpack".into());
    opts.legacy = true;
    let err = BuildTarget::resolve(&opts).unwrap_err();
    assert!(matches!(
      err.downcast_ref::<BuildError>(),
      Some(BuildError::LegacyUnsupported(BundlerKind::Webpack))
    ));
  }

  #[test]
  fn config_values_feed_options() {
    let config: BurrowConfig = toml::from_str(
      r#"
[build]
src = "app"
dest = "/srv/site"
bundler = "rollup"
legacy = true

[bundler]
server_command = "node build-server.js"
"#,
    )
    .unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let opts = BuildOptions::from_config(tmp.path(), &config);
    assert!(opts.legacy);
    assert_eq!(opts.commands.server.as_deref(), Some("node build-server.js"));

    let target = BuildTarget::resolve(&opts).unwrap();
    assert_eq!(target.src, tmp.path().join("app"));
    assert_eq!(target.dest, PathBuf::from("/srv/site"));
    assert_eq!(target.routes, tmp.path().join("src/routes"));
  }
}
