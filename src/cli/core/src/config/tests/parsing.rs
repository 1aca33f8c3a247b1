/* src/cli/core/src/config/tests/parsing.rs */

use super::*;

#[test]
fn parse_full_build_section() {
  let toml_str = r#"
[project]
name = "blog"

[build]
src = "app-src"
routes = "app-src/pages"
output = "app-src/node_modules/@burrow"
static = "public"
dest = "out/build"
bundler = "rollup"
legacy = true
ext = ".svelte .svx"

[bundler]
client_command = "npx rollup -c --silent"
"#;
  let config: BurrowConfig = toml::from_str(toml_str).unwrap();
  assert_eq!(config.project.name.as_deref(), Some("blog"));
  assert_eq!(config.build.src.as_deref(), Some("app-src"));
  assert_eq!(config.build.routes.as_deref(), Some("app-src/pages"));
  assert_eq!(config.build.static_dir.as_deref(), Some("public"));
  assert_eq!(config.build.dest.as_deref(), Some("out/build"));
  assert_eq!(config.build.bundler.as_deref(), Some("rollup"));
  assert_eq!(config.build.legacy, Some(true));
  assert_eq!(config.bundler.client_command.as_deref(), Some("npx rollup -c --silent"));
  assert!(config.bundler.server_command.is_none());
  assert!(config.build.validate().is_ok());
}

#[test]
fn parse_empty_file() {
  let config: BurrowConfig = toml::from_str("").unwrap();
  assert!(config.project.name.is_none());
  assert!(config.build.routes.is_none());
  assert!(config.build.legacy.is_none());
}

#[test]
fn validate_rejects_ext_without_dot() {
  let config: BurrowConfig = toml::from_str(
    r#"
[build]
ext = ".svelte html"
"#,
  )
  .unwrap();
  let err = config.build.validate().unwrap_err();
  assert!(err.to_string().contains("\"html\""));
}

#[test]
fn validate_rejects_blank_ext() {
  let config: BurrowConfig = toml::from_str(
    r#"
[build]
ext = "   "
"#,
  )
  .unwrap();
  let err = config.build.validate().unwrap_err();
  assert!(err.to_string().contains("at least one"));
}
