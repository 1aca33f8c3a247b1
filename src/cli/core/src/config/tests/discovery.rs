/* src/cli/core/src/config/tests/discovery.rs */

use super::*;

#[test]
fn find_config_in_parent_directory() {
  let tmp = tempfile::tempdir().unwrap();
  std::fs::write(tmp.path().join("burrow.toml"), "[project]\nname = \"site\"\n").unwrap();
  let nested = tmp.path().join("src/routes");
  std::fs::create_dir_all(&nested).unwrap();

  let found = find_burrow_config(&nested).unwrap();
  assert_eq!(found, tmp.path().canonicalize().unwrap().join("burrow.toml"));

  let config = load_burrow_config(&found).unwrap();
  assert_eq!(config.project.name.as_deref(), Some("site"));
}

#[test]
fn load_reports_parse_errors_with_path() {
  let tmp = tempfile::tempdir().unwrap();
  let path = tmp.path().join("burrow.toml");
  std::fs::write(&path, "[build\nroutes = 1").unwrap();
  let err = load_burrow_config(&path).unwrap_err();
  assert!(err.to_string().contains("failed to parse"));
}

#[test]
fn load_runs_validation() {
  let tmp = tempfile::tempdir().unwrap();
  let path = tmp.path().join("burrow.toml");
  std::fs::write(&path, "[build]\next = \"svelte\"\n").unwrap();
  assert!(load_burrow_config(&path).is_err());
}
