/* src/cli/core/src/shell.rs */

// Child-process and node_modules helpers shared by the build pipeline.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::ui::{self, DIM, RESET};

/// Captured result of a finished child process.
pub(crate) struct CommandOutput {
  pub status: ExitStatus,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  /// Failure report in the same shape for every caller: status line, then stderr, then stdout.
  pub fn failure_message(&self, label: &str) -> String {
    let mut msg = format!("{label} exited with status {}", self.status);
    if !self.stderr.is_empty() {
      msg.push('\n');
      msg.push_str(self.stderr.trim_end());
    }
    if !self.stdout.is_empty() {
      msg.push('\n');
      msg.push_str(self.stdout.trim_end());
    }
    msg
  }
}

/// Run `sh -c <command>` in `base_dir` and capture its output.
/// A non-zero exit is not an error here; callers decide what a failure means.
pub(crate) async fn capture_command(
  base_dir: &Path,
  command: &str,
  label: &str,
  env: &[(&str, String)],
) -> Result<CommandOutput> {
  ui::detail(&format!("{DIM}{command}{RESET}"));
  let mut cmd = Command::new("sh");
  cmd.args(["-c", command]);
  cmd.current_dir(base_dir);
  cmd.stdin(Stdio::null());
  cmd.kill_on_drop(true);
  for (k, v) in env {
    cmd.env(k, v);
  }
  let spinner = ui::spinner(&format!("running {label}"));
  let output = cmd.output().await;
  spinner.finish_and_clear();
  let output = output.with_context(|| format!("failed to run {label}"))?;
  Ok(CommandOutput {
    status: output.status,
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  })
}

/// Resolve a path inside node_modules by walking up parent directories.
/// Mirrors Node.js module resolution: checks `<dir>/node_modules/<suffix>` at each level.
pub(crate) fn resolve_node_module(start: &Path, suffix: &str) -> Option<PathBuf> {
  let mut dir = start.to_path_buf();
  loop {
    let candidate = dir.join("node_modules").join(suffix);
    if candidate.exists() {
      return Some(candidate);
    }
    if !dir.pop() {
      return None;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolve_node_module_walks_upward() {
    let tmp = tempfile::tempdir().unwrap();
    let pkg = tmp.path().join("node_modules/shimport");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("index.js"), "").unwrap();
    let nested = tmp.path().join("apps/site");
    std::fs::create_dir_all(&nested).unwrap();

    let found = resolve_node_module(&nested, "shimport/index.js").unwrap();
    assert_eq!(found, pkg.join("index.js"));
  }

  #[test]
  fn resolve_node_module_missing() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(resolve_node_module(tmp.path(), "definitely-not-installed/index.js").is_none());
  }

  #[tokio::test]
  async fn capture_command_reports_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let out = capture_command(tmp.path(), "echo oops >&2; exit 3", "bundler", &[]).await.unwrap();
    assert!(!out.status.success());
    let msg = out.failure_message("bundler");
    assert!(msg.starts_with("bundler exited with status"));
    assert!(msg.contains("oops"));
  }

  #[tokio::test]
  async fn capture_command_passes_env() {
    let tmp = tempfile::tempdir().unwrap();
    let env = [("BURROW_STAGE", "client".to_string())];
    let out = capture_command(tmp.path(), "printf %s \"$BURROW_STAGE\"", "probe", &env).await.unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, "client");
  }
}
