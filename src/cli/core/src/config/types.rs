/* src/cli/core/src/config/types.rs */

use anyhow::{Result, bail};
use serde::Deserialize;

/// Contents of `burrow.toml`. Every section is optional; a project without
/// the file builds with the defaults in `build::BuildOptions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BurrowConfig {
  #[serde(default)]
  pub project: ProjectConfig,
  #[serde(default)]
  pub build: BuildSection,
  #[serde(default)]
  pub bundler: BundlerSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
  pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSection {
  pub src: Option<String>,
  pub routes: Option<String>,
  pub output: Option<String>,
  #[serde(rename = "static")]
  pub static_dir: Option<String>,
  pub dest: Option<String>,
  pub bundler: Option<String>,
  #[serde(default)]
  pub legacy: Option<bool>,
  pub ext: Option<String>,
}

/// Per-stage command overrides for the bundler backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundlerSection {
  pub client_command: Option<String>,
  pub server_command: Option<String>,
  pub serviceworker_command: Option<String>,
}

impl BuildSection {
  pub fn validate(&self) -> Result<()> {
    if let Some(ext) = &self.ext {
      if ext.split_whitespace().next().is_none() {
        bail!("build.ext must list at least one extension");
      }
      if let Some(bad) = ext.split_whitespace().find(|e| !e.starts_with('.') || e.len() < 2) {
        bail!("build.ext entry \"{bad}\" must look like \".svelte\"");
      }
    }
    Ok(())
  }
}
