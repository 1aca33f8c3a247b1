/* src/cli/core/src/build/bundler/result.rs */

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::BundlerKind;
use crate::build::output::OutputArea;
use crate::build::route::ManifestData;

/// Chunk name of the client entry point.
pub const ENTRY_CHUNK: &str = "main";

/// One file a stage emitted. `file` is relative to the stage output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
  pub name: String,
  pub file: String,
  pub size: u64,
}

impl Chunk {
  pub fn is_source_map(&self) -> bool {
    self.file.ends_with(".map")
  }
}

#[derive(Debug, Clone)]
pub struct CompileResult {
  pub tag: &'static str,
  pub kind: BundlerKind,
  pub duration: Duration,
  pub chunks: Vec<Chunk>,
  /// Entry file per chunk name.
  pub assets: BTreeMap<String, String>,
  /// CSS files per chunk name.
  pub css: BTreeMap<String, Vec<String>>,
  /// Relative static imports per emitted JS file.
  pub imports: BTreeMap<String, Vec<String>>,
  pub warnings: Vec<String>,
}

impl CompileResult {
  pub(super) fn new(kind: BundlerKind, tag: &'static str, mut chunks: Vec<Chunk>) -> Self {
    chunks.sort_by(|a, b| a.file.cmp(&b.file));

    let mut assets = BTreeMap::new();
    let mut css: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for chunk in &chunks {
      if chunk.file.ends_with(".css") {
        css.entry(chunk.name.clone()).or_default().push(chunk.file.clone());
      } else if chunk.file.ends_with(".js") || chunk.file.ends_with(".mjs") {
        assets.entry(chunk.name.clone()).or_insert_with(|| chunk.file.clone());
      }
    }

    Self {
      tag,
      kind,
      duration: Duration::ZERO,
      chunks,
      assets,
      css,
      imports: BTreeMap::new(),
      warnings: Vec::new(),
    }
  }

  pub fn total_size(&self) -> u64 {
    self.chunks.iter().map(|c| c.size).sum()
  }

  /// Emitted files worth caching: everything except source maps.
  pub fn client_files(&self) -> Vec<String> {
    self.chunks.iter().filter(|c| !c.is_source_map()).map(|c| c.file.clone()).collect()
  }

  /// Build-metadata fragment for this stage, keyed by component file where
  /// the manifest names one.
  pub fn to_json(&self, manifest: &ManifestData, area: &OutputArea) -> Value {
    let mut css_chunks = Map::new();
    let mut dependencies = Map::new();
    for (name, file) in manifest.component_files() {
      if let Some(files) = self.css.get(name) {
        css_chunks.insert(file.to_string(), json!(files));
      }
      if let Some(entry) = self.assets.get(name) {
        dependencies.insert(file.to_string(), json!(self.dependencies_of(entry)));
      }
    }

    let chunks: Vec<Value> = self
      .chunks
      .iter()
      .filter(|c| !c.is_source_map())
      .map(|c| json!({ "name": c.name, "file": c.file }))
      .collect();

    let mut fragment = json!({
      "bundler": self.kind,
      "shimport": Value::Null,
      "assets": self.assets,
      "css": {
        "main": self.css.get(ENTRY_CHUNK).cloned().unwrap_or_default(),
        "chunks": css_chunks,
      },
      "chunks": chunks,
    });
    if self.kind == BundlerKind::Rollup {
      fragment["shimport"] = json!(area.shimport);
      fragment["dependencies"] = Value::Object(dependencies);
    }
    fragment
  }

  /// `entry` plus every file it reaches through relative imports, in discovery order.
  fn dependencies_of(&self, entry: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut order = Vec::new();
    let mut queue = vec![entry.to_string()];
    while let Some(file) = queue.pop() {
      if !seen.insert(file.clone()) {
        continue;
      }
      if let Some(imports) = self.imports.get(&file) {
        queue.extend(imports.iter().rev().cloned());
      }
      order.push(file);
    }
    order
  }
}
