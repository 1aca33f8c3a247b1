/* src/cli/core/src/build/bundler/webpack.rs */

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::BundlerKind;
use super::result::{Chunk, CompileResult};
use crate::build::error::BuildError;

/// The subset of `webpack --json` output the build reads.
#[derive(Debug, Deserialize)]
struct Stats {
  #[serde(default)]
  assets: Vec<Asset>,
  #[serde(default, rename = "assetsByChunkName")]
  assets_by_chunk_name: BTreeMap<String, OneOrMany>,
  #[serde(default)]
  errors: Vec<Message>,
  #[serde(default)]
  warnings: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Asset {
  name: String,
  #[serde(default)]
  size: u64,
  #[serde(default, rename = "chunkNames")]
  chunk_names: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

impl OneOrMany {
  fn first_script(&self) -> Option<&str> {
    match self {
      Self::One(file) => Some(file.as_str()),
      Self::Many(files) => files
        .iter()
        .find(|f| f.ends_with(".js") || f.ends_with(".mjs"))
        .or_else(|| files.first())
        .map(String::as_str),
    }
  }
}

/// webpack 4 reports plain strings, webpack 5 objects with a `message`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Message {
  Text(String),
  Detailed { message: String },
}

impl Message {
  fn into_text(self) -> String {
    match self {
      Self::Text(text) | Self::Detailed { message: text } => text,
    }
  }
}

pub(super) fn parse_stats(kind: BundlerKind, tag: &'static str, stdout: &str) -> Result<CompileResult> {
  // npx and loaders may print banners ahead of the JSON document
  let start = stdout.find('{').with_context(|| format!("webpack printed no stats for the {tag} bundle"))?;
  let stats: Stats = serde_json::from_str(&stdout[start..])
    .with_context(|| format!("failed to parse webpack stats for the {tag} bundle"))?;

  if !stats.errors.is_empty() {
    return Err(
      BuildError::Compile {
        stage: tag,
        bundler: kind,
        messages: stats.errors.into_iter().map(Message::into_text).collect(),
      }
      .into(),
    );
  }

  let chunks = stats
    .assets
    .into_iter()
    .map(|asset| {
      let name = asset
        .chunk_names
        .first()
        .and_then(|n| n.as_str().map(str::to_string))
        .unwrap_or_else(|| asset.name.split('.').next().unwrap_or_default().to_string());
      Chunk { name, file: asset.name, size: asset.size }
    })
    .collect();

  let mut result = CompileResult::new(kind, tag, chunks);
  if !stats.assets_by_chunk_name.is_empty() {
    result.assets = stats
      .assets_by_chunk_name
      .iter()
      .filter_map(|(name, files)| files.first_script().map(|f| (name.clone(), f.to_string())))
      .collect();
  }
  result.warnings = stats.warnings.into_iter().map(Message::into_text).collect();
  Ok(result)
}
