/* src/cli/core/src/build/run/tests.rs */

use std::path::Path;

use serde_json::Value;

use super::*;
use crate::build::error::BuildError;

const ROLLUP_CLIENT: &str = r#"d="$BURROW_DEST/client"; if [ "$BURROW_LEGACY_BUILD" = true ]; then printf 'var legacy=1;' > "$d/main.legacy.js"; else printf 'import "./shared.js";var css="__BURROW_CSS_PLACEHOLDER:about.svelte__";' > "$d/main.js"; printf '{}' > "$d/main.js.map"; printf 'export const x=1;' > "$d/shared.js"; printf 'import "./shared.js";' > "$d/about.js"; printf 'h1{}' > "$d/about.css"; fi"#;

const ROLLUP_SERVER: &str = r#"mkdir -p "$BURROW_DEST/server" && printf 'var c="__BURROW_CSS_PLACEHOLDER:about.svelte__";' > "$BURROW_DEST/server/server.js" && printf '%s' "${BURROW_LEGACY_BUILD:-unset}" > "$BURROW_DEST/server/legacy-flag.txt""#;

const ROLLUP_SERVICEWORKER: &str = r#"printf 'self.v=1;' > "$BURROW_DEST/service-worker.js""#;

const ROLLUP_EVERY_BUNDLE: &str = r#"d="$BURROW_DEST"; mkdir -p "$d/client" "$d/server"; printf 'var css="__BURROW_CSS_PLACEHOLDER:about.svelte__";' > "$d/client/main.js"; printf 'h1{}' > "$d/client/about.css"; printf 'var c="__BURROW_CSS_PLACEHOLDER:about.svelte__";' > "$d/server/server.js"; printf 'self.v=1;' > "$d/service-worker.js""#;

fn write(root: &Path, file: &str, content: &str) {
  let path = root.join(file);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
}

fn scaffold() -> tempfile::TempDir {
  let tmp = tempfile::tempdir().unwrap();
  let root = tmp.path();
  write(root, "node_modules/burrow/runtime/app.mjs", "export {};");
  write(root, "node_modules/shimport/package.json", r#"{"version":"2.0.5"}"#);
  write(root, "node_modules/shimport/index.js", "var __shimport__;");
  write(root, "src/template.html", "<html>\n  <head>%burrow.head%</head>\n  <body>%burrow.html%</body>\n</html>\n");
  write(root, "src/routes/index.svelte", "<h1>home</h1>");
  write(root, "src/routes/about.svelte", "<h1>about</h1>");
  write(root, "src/routes/posts/[id].svelte", "<h1>post</h1>");
  write(root, "static/favicon.png", "png");
  tmp
}

fn rollup_options(root: &Path) -> BuildOptions {
  let mut opts = BuildOptions::new(root);
  opts.bundler = Some("rollup".into());
  opts.commands.client = Some(ROLLUP_CLIENT.into());
  opts.commands.server = Some(ROLLUP_SERVER.into());
  opts
}

fn read_json(path: &Path) -> Value {
  serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn rollup_build_writes_client_metadata() {
  let tmp = scaffold();
  let mut tags = Vec::new();
  let mut reported = Vec::new();
  let report = build_with(&rollup_options(tmp.path()), |event| {
    tags.push(event.tag);
    if event.tag == "client" {
      reported = event.result.chunks.iter().map(|c| c.file.clone()).collect();
    }
  })
  .await
  .unwrap();

  assert_eq!(tags, ["client", "server"]);
  assert_eq!(report.routes, 3);
  assert!(report.serviceworker.is_none());

  let info = read_json(&report.build_json);
  assert!(info.get("legacy_assets").is_none());
  assert!(info.get("assets").is_none());
  let client = &info["client"];
  assert_eq!(client["bundler"], "rollup");
  assert_eq!(client["shimport"], "2.0.5");
  assert_eq!(client["assets"]["main"], "main.js");
  assert_eq!(client["css"]["chunks"]["about.svelte"], serde_json::json!(["about.css"]));
  assert_eq!(client["dependencies"]["about.svelte"], serde_json::json!(["about.js", "shared.js"]));

  let listed: Vec<&str> =
    client["chunks"].as_array().unwrap().iter().map(|c| c["file"].as_str().unwrap()).collect();
  assert!(reported.contains(&"main.js.map".to_string()));
  for file in reported.iter().filter(|f| !f.ends_with(".map")) {
    assert!(listed.contains(&file.as_str()), "{file} missing from build.json");
  }
  assert!(!listed.contains(&"main.js.map"));
  assert!(!listed.iter().any(|f| f.starts_with("shimport@")));

  let dest = tmp.path().join("__burrow__/build");
  assert!(dest.join("client/shimport@2.0.5.js").is_file());
  assert!(dest.join("template.html").is_file());
  assert!(tmp.path().join("src/node_modules/@burrow/app.mjs").is_file());
  assert!(tmp.path().join("src/node_modules/@burrow/internal/manifest-client.mjs").is_file());
}

#[tokio::test]
async fn rollup_build_injects_css_into_client_and_server() {
  let tmp = scaffold();
  let report = build(&rollup_options(tmp.path())).await.unwrap();

  let main = std::fs::read_to_string(report.dest.join("client/main.js")).unwrap();
  assert!(main.contains(r#"var css=["about.css"];"#));
  let server = std::fs::read_to_string(report.dest.join("server/server.js")).unwrap();
  assert_eq!(server, r#"var c=["about.css"];"#);
}

#[tokio::test]
async fn single_config_for_every_stage_keeps_client_injected() {
  let tmp = scaffold();
  write(tmp.path(), "src/service-worker.js", "");
  let mut opts = BuildOptions::new(tmp.path());
  opts.bundler = Some("rollup".into());
  opts.commands.client = Some(ROLLUP_EVERY_BUNDLE.into());
  opts.commands.server = Some(ROLLUP_EVERY_BUNDLE.into());
  opts.commands.serviceworker = Some(ROLLUP_EVERY_BUNDLE.into());

  let mut sw_files = Vec::new();
  let report = build_with(&opts, |event| {
    if event.tag == "serviceworker" {
      sw_files = event.result.chunks.iter().map(|c| c.file.clone()).collect();
    }
  })
  .await
  .unwrap();

  let main = std::fs::read_to_string(report.dest.join("client/main.js")).unwrap();
  assert_eq!(main, r#"var css=["about.css"];"#);
  let server = std::fs::read_to_string(report.dest.join("server/server.js")).unwrap();
  assert_eq!(server, r#"var c=["about.css"];"#);
  assert_eq!(sw_files, ["service-worker.js"]);
}

#[tokio::test]
async fn legacy_build_adds_legacy_assets() {
  let tmp = scaffold();
  let mut opts = rollup_options(tmp.path());
  opts.legacy = true;
  let mut tags = Vec::new();
  let report = build_with(&opts, |event| tags.push(event.tag)).await.unwrap();

  assert_eq!(tags, ["client", "client (legacy)", "server"]);
  let info = read_json(&report.build_json);
  assert_eq!(info["legacy_assets"], serde_json::json!({ "main": "main.legacy.js" }));
  assert_ne!(info["legacy_assets"], info["client"]["assets"]);

  // only the legacy client process sees the flag
  let flag = std::fs::read_to_string(report.dest.join("server/legacy-flag.txt")).unwrap();
  assert_eq!(flag, "unset");
}

#[tokio::test]
async fn webpack_legacy_rejected_before_reset() {
  let tmp = scaffold();
  write(tmp.path(), "__burrow__/build/keep.txt", "previous build");
  let mut opts = BuildOptions::new(tmp.path());
  opts.bundler = Some("webpack".into());
  opts.legacy = true;

  let err = build(&opts).await.unwrap_err();
  assert!(matches!(err.downcast_ref::<BuildError>(), Some(BuildError::LegacyUnsupported(_))));
  assert!(tmp.path().join("__burrow__/build/keep.txt").is_file());
  assert!(!tmp.path().join("src/node_modules/@burrow").exists());
}

#[tokio::test]
async fn consecutive_builds_are_identical() {
  let tmp = scaffold();
  let opts = rollup_options(tmp.path());

  let first = build(&opts).await.unwrap();
  let first_json = std::fs::read_to_string(&first.build_json).unwrap();
  write(tmp.path(), "__burrow__/build/client/stale.js", "old");
  write(tmp.path(), "src/node_modules/@burrow/stale.mjs", "old");

  let second = build(&opts).await.unwrap();
  let second_json = std::fs::read_to_string(&second.build_json).unwrap();
  assert_eq!(first_json, second_json);
  assert!(!second.dest.join("client/stale.js").exists());
  assert!(!tmp.path().join("src/node_modules/@burrow/stale.mjs").exists());
}

#[tokio::test]
async fn old_layout_reports_migration() {
  let tmp = scaffold();
  std::fs::remove_file(tmp.path().join("src/template.html")).unwrap();
  write(tmp.path(), "app/template.html", "<html></html>");

  let err = build(&rollup_options(tmp.path())).await.unwrap_err();
  assert!(matches!(err.downcast_ref::<BuildError>(), Some(BuildError::LayoutMigration { .. })));
  assert!(!tmp.path().join("__burrow__/build/build.json").exists());
}

#[tokio::test]
async fn serviceworker_receives_client_files_without_maps() {
  let tmp = scaffold();
  write(tmp.path(), "src/service-worker.js", "// sw entry");
  let mut opts = rollup_options(tmp.path());
  opts.commands.serviceworker = Some(ROLLUP_SERVICEWORKER.into());

  let mut client_files = Vec::new();
  let mut tags = Vec::new();
  let report = build_with(&opts, |event| {
    tags.push(event.tag);
    if event.tag == "client" {
      client_files = event.result.chunks.iter().map(|c| c.file.clone()).collect();
    }
  })
  .await
  .unwrap();

  assert_eq!(tags, ["client", "server", "serviceworker"]);
  let expected: Vec<String> = client_files
    .iter()
    .filter(|f| !f.ends_with(".map"))
    .map(|f| format!("client/{f}"))
    .collect();
  assert_eq!(report.client_files, expected);

  let sw_path = report.serviceworker.unwrap();
  assert_eq!(sw_path, tmp.path().join("src/node_modules/@burrow/service-worker.js"));
  let sw = std::fs::read_to_string(sw_path).unwrap();
  assert!(sw.contains("\"client/main.js\""));
  assert!(sw.contains("\"favicon.png\""));
  assert!(!sw.contains(".map"));
  assert!(report.dest.join("service-worker.js").is_file());
}

#[tokio::test]
async fn failing_client_compile_stops_the_build() {
  let tmp = scaffold();
  let mut opts = rollup_options(tmp.path());
  opts.commands.client = Some("echo 'Unexpected token' >&2; exit 2".into());

  let err = build(&opts).await.unwrap_err();
  match err.downcast_ref::<BuildError>() {
    Some(BuildError::Compile { stage, messages, .. }) => {
      assert_eq!(*stage, "client");
      assert!(messages[0].contains("Unexpected token"));
    }
    other => panic!("expected compile error, got {other:?}"),
  }
  assert!(!tmp.path().join("__burrow__/build/build.json").exists());
}

#[tokio::test]
async fn webpack_build_reads_stats() {
  let tmp = scaffold();
  let stats = r#"{"assets":[{"name":"main.1a.js","size":120,"chunkNames":["main"]},{"name":"main.1a.js.map","size":300,"chunkNames":["main"]},{"name":"about.2b.js","size":40,"chunkNames":["about"]},{"name":"about.2b.css","size":12,"chunkNames":["about"]}],"assetsByChunkName":{"main":["main.1a.js","main.1a.js.map"],"about":["about.2b.css","about.2b.js"]},"errors":[],"warnings":[{"message":"large bundle"}]}"#;
  let mut opts = BuildOptions::new(tmp.path());
  opts.bundler = Some("webpack".into());
  opts.commands.client = Some(format!("printf '%s' '{stats}'"));
  opts.commands.server = Some(r#"printf '{"assets":[],"errors":[]}'"#.into());

  let mut warnings = Vec::new();
  let report = build_with(&opts, |event| warnings.extend(event.result.warnings.clone())).await.unwrap();
  assert_eq!(warnings, ["large bundle"]);

  let client = &read_json(&report.build_json)["client"];
  assert_eq!(client["bundler"], "webpack");
  assert!(client["shimport"].is_null());
  assert!(client.get("dependencies").is_none());
  assert_eq!(client["assets"], serde_json::json!({ "about": "about.2b.js", "main": "main.1a.js" }));
  assert_eq!(client["css"]["chunks"]["about.svelte"], serde_json::json!(["about.2b.css"]));
  assert_eq!(client["chunks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn webpack_stats_errors_fail_the_stage() {
  let tmp = scaffold();
  let mut opts = BuildOptions::new(tmp.path());
  opts.bundler = Some("webpack".into());
  opts.commands.client = Some(r#"printf '{"assets":[],"errors":["Module not found: ./nope"]}'"#.into());

  let err = build(&opts).await.unwrap_err();
  match err.downcast_ref::<BuildError>() {
    Some(BuildError::Compile { bundler, messages, .. }) => {
      assert_eq!(bundler.as_str(), "webpack");
      assert_eq!(messages, &["Module not found: ./nope"]);
    }
    other => panic!("expected compile error, got {other:?}"),
  }
}

#[tokio::test]
async fn missing_routes_dir_fails_after_reset() {
  let tmp = scaffold();
  std::fs::remove_dir_all(tmp.path().join("src/routes")).unwrap();
  let err = build(&rollup_options(tmp.path())).await.unwrap_err();
  assert!(matches!(err.downcast_ref::<BuildError>(), Some(BuildError::RoutesDirMissing(_))));
}
