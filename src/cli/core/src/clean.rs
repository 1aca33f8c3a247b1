/* src/cli/core/src/clean.rs */

// `burrow clean` command: removes the build destination and the generated
// intermediate output.

use std::path::Path;

use anyhow::Result;

use crate::build::BuildOptions;
use crate::build::output::remove_dir;
use crate::ui;

pub fn run_clean(opts: &BuildOptions) -> Result<()> {
  ui::step(1, 1, "Removing build output");
  let (output, dest) = opts.output_dirs()?;
  delete_dir_if_exists(&dest)?;
  delete_dir_if_exists(&output)?;
  ui::ok("clean complete");
  Ok(())
}

fn delete_dir_if_exists(path: &Path) -> Result<()> {
  if remove_dir(path)? {
    ui::removed(path);
  }
  Ok(())
}
