/* src/cli/core/src/build/bundler/inject.rs */

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use walkdir::WalkDir;

const PLACEHOLDER_PREFIX: &str = "__BURROW_CSS_PLACEHOLDER:";

fn placeholder_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#""__BURROW_CSS_PLACEHOLDER:([^"]+?)__"|'__BURROW_CSS_PLACEHOLDER:([^']+?)__'"#)
      .unwrap()
  })
}

/// String literal the generated client manifest emits for a component's CSS.
pub fn css_placeholder(component_file: &str) -> String {
  format!("\"{PLACEHOLDER_PREFIX}{component_file}__\"")
}

/// Replace CSS placeholders in every `.js` file under `dir` with the CSS file
/// list `build.json` records for that component. Returns the rewritten count.
pub fn inject_resources(build_json: &Path, dir: &Path) -> Result<usize> {
  let content = std::fs::read_to_string(build_json)
    .with_context(|| format!("failed to read {}", build_json.display()))?;
  let info: serde_json::Value = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse {}", build_json.display()))?;
  let css_chunks: BTreeMap<String, Vec<String>> = info
    .pointer("/client/css/chunks")
    .cloned()
    .map(serde_json::from_value)
    .transpose()
    .with_context(|| format!("malformed client.css.chunks in {}", build_json.display()))?
    .unwrap_or_default();

  let mut rewritten = 0;
  if !dir.is_dir() {
    return Ok(rewritten);
  }
  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = entry.with_context(|| format!("failed to scan {}", dir.display()))?;
    let path = entry.path();
    if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "js") {
      continue;
    }
    let source =
      std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !source.contains(PLACEHOLDER_PREFIX) {
      continue;
    }
    let replaced = placeholder_re().replace_all(&source, |caps: &Captures| {
      let file = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
      let files = css_chunks.get(file).map(Vec::as_slice).unwrap_or_default();
      serde_json::to_string(files).unwrap_or_else(|_| "[]".to_string())
    });
    std::fs::write(path, replaced.as_bytes())
      .with_context(|| format!("failed to write {}", path.display()))?;
    rewritten += 1;
  }
  Ok(rewritten)
}
