/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::BurrowConfig;

/// Walk upward from `start` to find `burrow.toml`, like Cargo.toml discovery
pub fn find_burrow_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join("burrow.toml");
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("burrow.toml not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_burrow_config(path: &Path) -> Result<BurrowConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: BurrowConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.build.validate()?;
  Ok(config)
}
