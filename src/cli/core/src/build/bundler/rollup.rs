/* src/cli/core/src/build/bundler/rollup.rs */

// Rollup reports nothing machine-readable on stdout, so a stage's chunks are
// the files that appeared or changed in its output directory during the run.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use super::BundlerKind;
use super::result::{Chunk, CompileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FileStamp {
  modified: Option<SystemTime>,
  len: u64,
}

/// Relative path -> stamp for every file under `dir`.
pub(super) type Snapshot = BTreeMap<String, FileStamp>;

fn import_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?:\bimport|\bexport)\s*(?:[\w*${}\s,]+\s*from\s*)?["'](\./[^"']+)["']"#).unwrap()
  })
}

/// Stamp every file under `dir`, leaving out the top-level directories in `skip`.
pub(super) fn snapshot(dir: &Path, skip: &[&str]) -> Result<Snapshot> {
  let mut files = Snapshot::new();
  if !dir.is_dir() {
    return Ok(files);
  }
  let walker = WalkDir::new(dir).sort_by_file_name().into_iter().filter_entry(|e| {
    let skipped = e.depth() == 1
      && e.file_type().is_dir()
      && e.file_name().to_str().is_some_and(|n| skip.iter().any(|s| *s == n));
    !skipped
  });
  for entry in walker {
    let entry = entry.with_context(|| format!("failed to scan {}", dir.display()))?;
    if !entry.file_type().is_file() {
      continue;
    }
    let meta = entry.metadata().with_context(|| format!("failed to stat {}", entry.path().display()))?;
    let stamp = FileStamp { modified: meta.modified().ok(), len: meta.len() };
    files.insert(relative_posix(dir, entry.path()), stamp);
  }
  Ok(files)
}

/// Turn the files emitted since `before` into a compile result.
pub(super) fn collect(
  kind: BundlerKind,
  tag: &'static str,
  dir: &Path,
  skip: &[&str],
  before: &Snapshot,
  stderr: &str,
) -> Result<CompileResult> {
  let after = snapshot(dir, skip)?;
  let mut chunks = Vec::new();
  for (file, stamp) in &after {
    if before.get(file) == Some(stamp) {
      continue;
    }
    chunks.push(Chunk { name: chunk_name(file).to_string(), file: file.clone(), size: stamp.len });
  }

  let mut result = CompileResult::new(kind, tag, chunks);
  for chunk in &result.chunks {
    if !chunk.file.ends_with(".js") && !chunk.file.ends_with(".mjs") {
      continue;
    }
    let source = std::fs::read_to_string(dir.join(&chunk.file))
      .with_context(|| format!("failed to read {}", chunk.file))?;
    let imports = relative_imports(&chunk.file, &source);
    if !imports.is_empty() {
      result.imports.insert(chunk.file.clone(), imports);
    }
  }
  result.warnings = parse_warnings(stderr);
  Ok(result)
}

/// `client.4f2a.js` -> `client`, `legacy/about.js` -> `about`.
pub(super) fn chunk_name(file: &str) -> &str {
  let base = file.rsplit('/').next().unwrap_or(file);
  base.split('.').next().unwrap_or(base)
}

/// Relative `import`/`export ... from` targets of `file`, resolved against its directory.
fn relative_imports(file: &str, source: &str) -> Vec<String> {
  let dir = file.rfind('/').map_or("", |i| &file[..i]);
  let mut imports: Vec<String> = import_re()
    .captures_iter(source)
    .map(|cap| {
      let spec = cap[1].trim_start_matches("./");
      if dir.is_empty() { spec.to_string() } else { format!("{dir}/{spec}") }
    })
    .collect();
  imports.dedup();
  imports
}

/// Rollup prefixes each warning with `(!)` on stderr.
fn parse_warnings(stderr: &str) -> Vec<String> {
  stderr
    .lines()
    .filter_map(|line| line.trim_start().strip_prefix("(!)"))
    .map(|w| w.trim().to_string())
    .collect()
}

fn relative_posix(base: &Path, path: &Path) -> String {
  let rel = path.strip_prefix(base).unwrap_or(path);
  rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}
