/* src/cli/core/src/ui.rs */

// Terminal output for `burrow`. Everything is indented under a numbered
// stage header; bundler output is summarised, never echoed raw.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const VERSION: &str = env!("CARGO_PKG_VERSION");
const INDENT: &str = "        ";

pub fn banner(cmd: &str, project: Option<&str>) {
  println!();
  match project {
    Some(name) => println!("  {BOLD}burrow{RESET} {cmd} {CYAN}{name}{RESET} {DIM}v{VERSION}{RESET}"),
    None => println!("  {BOLD}burrow{RESET} {cmd} {DIM}v{VERSION}{RESET}"),
  }
  println!();
}

pub fn step(n: u32, total: u32, msg: &str) {
  println!("  {BOLD}[{n}/{total}]{RESET} {msg}...");
}

pub fn detail(msg: &str) {
  println!("{INDENT}{msg}");
}

pub fn detail_ok(msg: &str) {
  println!("{INDENT}{GREEN}\u{2713}{RESET} {msg}");
}

pub fn ok(msg: &str) {
  println!("  {GREEN}\u{2713}{RESET} {msg}");
}

pub fn fail(msg: &str) {
  println!("  {RED}\u{2717}{RESET} {msg}");
}

/// A warning a bundler printed while compiling `tag`.
pub fn bundler_warning(tag: &str, msg: &str) {
  println!("{INDENT}{YELLOW}warning{RESET} {DIM}{tag}{RESET} {msg}");
}

/// Summary line for a finished compile stage.
pub fn stage_done(tag: &str, files: usize, bytes: u64, elapsed: Duration) {
  detail_ok(&stage_summary(tag, files, bytes, elapsed));
}

/// One emitted bundle file under its stage tag.
pub fn bundle_file(tag: &str, file: &str, bytes: u64) {
  println!("{INDENT}{DIM}{tag}{RESET} {file}  {DIM}{}{RESET}", format_size(bytes));
}

pub fn removed(path: &Path) {
  println!("{INDENT}{DIM}removed{RESET} {}", path.display());
}

/// Spinner shown while a bundler child runs; indicatif hides it when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
  let pb = ProgressBar::new_spinner();
  if let Ok(style) = ProgressStyle::with_template(&format!("{INDENT}{{spinner:.cyan}} {{msg}}")) {
    pb.set_style(style);
  }
  pb.set_message(msg.to_string());
  pb.enable_steady_tick(Duration::from_millis(80));
  pb
}

pub fn blank() {
  println!();
}

fn stage_summary(tag: &str, files: usize, bytes: u64, elapsed: Duration) -> String {
  let noun = if files == 1 { "file" } else { "files" };
  format!("{tag}: {files} {noun}, {} in {:.1}s", format_size(bytes), elapsed.as_secs_f64())
}

pub fn format_size(bytes: u64) -> String {
  if bytes >= 1_000_000 {
    format!("{:.1} MB", bytes as f64 / 1_000_000.0)
  } else if bytes >= 1_000 {
    format!("{:.1} kB", bytes as f64 / 1_000.0)
  } else {
    format!("{bytes} B")
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::{format_size, stage_summary};

  #[test]
  fn format_size_units() {
    assert_eq!(format_size(512), "512 B");
    assert_eq!(format_size(2_048), "2.0 kB");
    assert_eq!(format_size(3_500_000), "3.5 MB");
  }

  #[test]
  fn stage_summary_counts_files() {
    assert_eq!(
      stage_summary("client (legacy)", 1, 900, Duration::from_millis(1_300)),
      "client (legacy): 1 file, 900 B in 1.3s"
    );
    assert_eq!(stage_summary("server", 3, 4_200, Duration::from_secs(2)), "server: 3 files, 4.2 kB in 2.0s");
  }
}
