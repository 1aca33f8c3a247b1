/* src/cli/core/src/build/output.rs */

// Owns the intermediate output directory and the destination directory.
// Both are wiped and repopulated at the start of every build.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use walkdir::WalkDir;

use super::target::BuildTarget;
use crate::shell::resolve_node_module;
use crate::ui;

/// The freshly reset directories a build writes into.
#[derive(Debug, Clone)]
pub struct OutputArea {
  pub output: PathBuf,
  pub dest: PathBuf,
  /// Version of the copied shim loader.
  pub shimport: String,
}

impl OutputArea {
  pub fn client_dir(&self) -> PathBuf {
    self.dest.join("client")
  }

  pub fn server_dir(&self) -> PathBuf {
    self.dest.join("server")
  }
}

#[derive(Deserialize)]
struct PackageJson {
  version: String,
}

/// Wipe and recreate output and dest, then copy the runtime and shim loader in.
pub fn reset(target: &BuildTarget) -> Result<OutputArea> {
  recreate_dir(&target.output)?;
  let copied = copy_runtime(&target.cwd, &target.output)?;
  ui::detail_ok(&format!("runtime: {copied} files"));

  recreate_dir(&target.dest)?;
  let client_dir = target.dest.join("client");
  std::fs::create_dir_all(&client_dir)
    .with_context(|| format!("failed to create {}", client_dir.display()))?;
  let version = copy_shimport(&target.cwd, &client_dir)?;
  ui::detail_ok(&format!("shimport@{version}.js"));

  Ok(OutputArea {
    output: target.output.clone(),
    dest: target.dest.clone(),
    shimport: version,
  })
}

/// Delete `dir` if present and create it empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
  remove_dir(dir)?;
  std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}

/// Delete `dir` recursively. Returns false when there was nothing to delete.
pub fn remove_dir(dir: &Path) -> Result<bool> {
  if !dir.exists() {
    return Ok(false);
  }
  std::fs::remove_dir_all(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
  Ok(true)
}

/// Copy the framework runtime (`node_modules/burrow/runtime`) into `output`.
pub fn copy_runtime(cwd: &Path, output: &Path) -> Result<usize> {
  let runtime = resolve_node_module(cwd, "burrow/runtime")
    .ok_or_else(|| anyhow::anyhow!("burrow runtime not found -- install the burrow package"))?;
  copy_dir(&runtime, output)
}

/// Copy the shim loader to `<client_dir>/shimport@<version>.js` and return the version.
pub fn copy_shimport(cwd: &Path, client_dir: &Path) -> Result<String> {
  let pkg = resolve_node_module(cwd, "shimport/package.json")
    .ok_or_else(|| anyhow::anyhow!("shimport not found -- install the shimport package"))?;
  let content =
    std::fs::read_to_string(&pkg).with_context(|| format!("failed to read {}", pkg.display()))?;
  let PackageJson { version } =
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", pkg.display()))?;

  let source = pkg.with_file_name("index.js");
  let target = client_dir.join(format!("shimport@{version}.js"));
  std::fs::copy(&source, &target).with_context(|| {
    format!("failed to copy {} to {}", source.display(), target.display())
  })?;
  Ok(version)
}

fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
  let mut count = 0;
  for entry in WalkDir::new(from).sort_by_file_name() {
    let entry = entry.with_context(|| format!("failed to scan {}", from.display()))?;
    let rel = entry.path().strip_prefix(from).unwrap_or(entry.path());
    let target = to.join(rel);
    if entry.file_type().is_dir() {
      std::fs::create_dir_all(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;
    } else {
      std::fs::copy(entry.path(), &target)
        .with_context(|| format!("failed to copy {}", entry.path().display()))?;
      count += 1;
    }
  }
  Ok(count)
}
