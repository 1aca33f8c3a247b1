/* src/cli/core/src/build/template.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::error::BuildError;

/// Read `<src>/template.html`. A project still using the old `app/` layout
/// gets a migration error; any other failure is the raw I/O error.
pub fn read_template(cwd: &Path, src: &Path) -> Result<String> {
  let path = src.join("template.html");
  match std::fs::read_to_string(&path) {
    Ok(source) => Ok(source),
    Err(err) => {
      let old = cwd.join("app/template.html");
      if old.exists() {
        return Err(BuildError::LayoutMigration { found: old, expected: path }.into());
      }
      Err(err.into())
    }
  }
}

pub fn minify_template(source: &str) -> String {
  let mut cfg = minify_html::Cfg::new();
  cfg.keep_closing_tags = true;
  cfg.keep_html_and_head_opening_tags = true;
  cfg.keep_comments = false;
  cfg.minify_css = true;
  cfg.minify_js = false;
  let minified = minify_html::minify(source.as_bytes(), &cfg);
  String::from_utf8_lossy(&minified).into_owned()
}

/// Minify the project template into `<dest>/template.html`.
pub fn write_template(cwd: &Path, src: &Path, dest: &Path) -> Result<PathBuf> {
  let source = read_template(cwd, src)?;
  let out = dest.join("template.html");
  std::fs::write(&out, minify_template(&source))
    .with_context(|| format!("failed to write {}", out.display()))?;
  Ok(out)
}
