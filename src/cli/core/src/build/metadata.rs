/* src/cli/core/src/build/metadata.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::error::BuildError;

/// The persisted `build.json`: one entry per folded fragment, keys sorted.
///
/// Fragments stay nested under their key, so the client's `assets` are read
/// from `client.assets`, not the top level, with `legacy_assets` beside
/// `client` for legacy builds:
///
/// ```json
/// { "client": { "assets": { "main": "main.js" }, ... }, "legacy_assets": { ... } }
/// ```
#[derive(Debug, Default)]
pub struct BuildMetadata {
  fields: Map<String, Value>,
}

impl BuildMetadata {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a fragment under `key`. Keys are write-once.
  pub fn fold(&mut self, key: &str, fragment: Value) -> Result<(), BuildError> {
    if self.fields.contains_key(key) {
      return Err(BuildError::MetadataKeyConflict(key.to_string()));
    }
    self.fields.insert(key.to_string(), fragment);
    Ok(())
  }

  pub fn to_pretty_string(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(&self.fields)?)
  }

  /// Write `<dest>/build.json`. Consumes the metadata; it is final once written.
  pub fn write(self, dest: &Path) -> Result<PathBuf> {
    let path = dest.join("build.json");
    std::fs::write(&path, self.to_pretty_string()?)
      .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
  }
}
