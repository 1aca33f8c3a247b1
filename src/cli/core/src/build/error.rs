/* src/cli/core/src/build/error.rs */

// Failures the build reports by identity. Everything else (I/O, child
// process spawn errors) travels as the underlying error inside anyhow.

use std::path::PathBuf;

use thiserror::Error;

use super::bundler::BundlerKind;

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("'{0}' is not a valid option for --bundler -- must be either 'rollup' or 'webpack'")]
  UnsupportedBundler(String),

  #[error("could not find rollup.config.js or webpack.config.js in {}", .0.display())]
  BundlerNotFound(PathBuf),

  #[error("legacy builds are not supported for projects using {0}")]
  LegacyUnsupported(BundlerKind),

  #[error(
    "the default folder structure has changed:\n  app/    --> src/\n  routes/ --> src/routes/\n  assets/ --> static/\nmove {} to {} and try again",
    .found.display(),
    .expected.display()
  )]
  LayoutMigration { found: PathBuf, expected: PathBuf },

  #[error("routes directory {} does not exist", .0.display())]
  RoutesDirMissing(PathBuf),

  #[error("invalid route {file} -- {reason}")]
  InvalidRoute { file: String, reason: &'static str },

  #[error("the {first} and {second} {kind} clash")]
  RouteClash { kind: &'static str, first: String, second: String },

  #[error("{bundler} failed to compile the {stage} bundle:\n{}", .messages.join("\n"))]
  Compile { stage: &'static str, bundler: BundlerKind, messages: Vec<String> },

  #[error("build metadata already contains a \"{0}\" entry")]
  MetadataKeyConflict(String),
}
