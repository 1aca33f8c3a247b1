/* src/cli/core/src/build/app.rs */

// Generated JS modules: the client and server route manifests under
// `<output>/internal/`, and the service-worker manifest.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::bundler::css_placeholder;
use super::route::{Component, ManifestData, Page, PagePart};

const HEADER: &str = "// This file is generated by burrow. Do not edit it.\n";

/// Paths the generated modules refer to.
pub struct AppContext<'a> {
  pub manifest: &'a ManifestData,
  pub cwd: &'a Path,
  pub src: &'a Path,
  pub routes: &'a Path,
  pub output: &'a Path,
  pub dest: &'a Path,
  pub dev: bool,
}

/// Write `manifest-client.mjs` and `manifest-server.mjs`. Files whose content
/// is unchanged are left alone; returns the paths that were rewritten.
pub fn create_app(ctx: &AppContext<'_>) -> Result<Vec<PathBuf>> {
  let internal = ctx.output.join("internal");
  std::fs::create_dir_all(&internal)
    .with_context(|| format!("failed to create {}", internal.display()))?;

  let mut written = Vec::new();
  let client = internal.join("manifest-client.mjs");
  if write_if_changed(&client, &generate_client_manifest(ctx, &internal))? {
    written.push(client);
  }
  let server = internal.join("manifest-server.mjs");
  if write_if_changed(&server, &generate_server_manifest(ctx, &internal))? {
    written.push(server);
  }
  Ok(written)
}

fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
  if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
    return Ok(false);
  }
  std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(true)
}

fn generate_client_manifest(ctx: &AppContext<'_>, internal: &Path) -> String {
  let m = ctx.manifest;
  let mut out = String::from(HEADER);

  let (root_path, error_path) = wrapper_paths(ctx, internal);
  let _ = writeln!(out, "export {{ default as Root }} from {};", quote(&root_path));
  if m.root.has_preload {
    let _ = writeln!(out, "export {{ preload as root_preload }} from {};", quote(&root_path));
  } else {
    out.push_str("export const root_preload = () => ({});\n");
  }
  let _ = writeln!(out, "export {{ default as ErrorComponent }} from {};", quote(&error_path));
  out.push('\n');

  out.push_str("export const ignore = [");
  let ignore: Vec<String> = m.server_routes.iter().map(|r| format!("/{}/", r.pattern)).collect();
  out.push_str(&ignore.join(", "));
  out.push_str("];\n\n");

  out.push_str("export const components = [\n");
  for component in &m.components {
    let Some(file) = &component.file else { continue };
    let _ = writeln!(out, "  {{");
    let _ = writeln!(out, "    js: () => import({}),", quote(&import_path(ctx.routes, internal, file)));
    let _ = writeln!(out, "    css: {}", css_placeholder(file));
    let _ = writeln!(out, "  }},");
  }
  out.push_str("];\n\n");

  out.push_str("export const routes = (d => [\n");
  for page in &m.pages {
    let _ = writeln!(out, "  {{");
    if let Some(file) = page_file(page) {
      let _ = writeln!(out, "    // {file}");
    }
    let _ = writeln!(out, "    pattern: /{}/,", page.pattern);
    out.push_str("    parts: [\n");
    for part in &page.parts {
      match part {
        None => out.push_str("      null,\n"),
        Some(part) => {
          let index = m.components.iter().position(|c| c == &part.component).unwrap_or_default();
          match params_fn(part) {
            Some(params) => {
              let _ = writeln!(out, "      {{ i: {index}, params: {params} }},");
            }
            None => {
              let _ = writeln!(out, "      {{ i: {index} }},");
            }
          }
        }
      }
    }
    out.push_str("    ]\n");
    out.push_str("  },\n");
  }
  out.push_str("])(decodeURIComponent);\n");

  if ctx.dev {
    out.push_str("\nif (typeof window !== 'undefined') {\n  window.__burrow_dev__ = true;\n}\n");
  }
  out
}

fn generate_server_manifest(ctx: &AppContext<'_>, internal: &Path) -> String {
  let m = ctx.manifest;
  let mut out = String::from(HEADER);

  for route in &m.server_routes {
    let path = import_path(ctx.routes, internal, &route.file);
    let _ = writeln!(out, "import * as {} from {};", route.name, quote(&path));
  }
  for (i, component) in m.components.iter().enumerate() {
    let Some(file) = &component.file else { continue };
    let path = import_path(ctx.routes, internal, file);
    if component.has_preload {
      let _ = writeln!(out, "import component_{i}, {{ preload as preload_{i} }} from {};", quote(&path));
    } else {
      let _ = writeln!(out, "import component_{i} from {};", quote(&path));
    }
  }
  let (root_path, error_path) = wrapper_paths(ctx, internal);
  if m.root.has_preload {
    let _ = writeln!(out, "import root, {{ preload as root_preload }} from {};", quote(&root_path));
  } else {
    let _ = writeln!(out, "import root from {};", quote(&root_path));
  }
  let _ = writeln!(out, "import error from {};", quote(&error_path));
  out.push_str("\nconst d = decodeURIComponent;\n\n");

  out.push_str("export const manifest = {\n  server_routes: [\n");
  for route in &m.server_routes {
    let _ = writeln!(out, "    {{");
    let _ = writeln!(out, "      // {}", route.file);
    let _ = writeln!(out, "      pattern: /{}/,", route.pattern);
    let _ = writeln!(out, "      handlers: {},", route.name);
    let _ = writeln!(out, "      params: {}", params_body(&route.params));
    let _ = writeln!(out, "    }},");
  }
  out.push_str("  ],\n\n  pages: [\n");
  for page in &m.pages {
    let _ = writeln!(out, "    {{");
    let _ = writeln!(out, "      // {}", page_file(page).unwrap_or_default());
    let _ = writeln!(out, "      pattern: /{}/,", page.pattern);
    out.push_str("      parts: [\n");
    for part in &page.parts {
      let Some(part) = part else {
        out.push_str("        null,\n");
        continue;
      };
      let i = m.components.iter().position(|c| c == &part.component).unwrap_or_default();
      let preload = if part.component.has_preload { format!("preload_{i}") } else { "null".to_string() };
      let _ = writeln!(out, "        {{");
      let _ = writeln!(out, "          name: {},", quote(&part.component.name));
      let _ = writeln!(out, "          file: {},", quote(part.component.file.as_deref().unwrap_or_default()));
      let _ = writeln!(out, "          component: component_{i},");
      let _ = writeln!(out, "          preload: {preload},");
      if let Some(params) = params_fn(part) {
        let _ = writeln!(out, "          params: {params}");
      }
      let _ = writeln!(out, "        }},");
    }
    out.push_str("      ]\n    },\n");
  }
  out.push_str("  ],\n\n");
  let root_preload = if m.root.has_preload { "root_preload" } else { "() => {}" };
  let _ = writeln!(out, "  root,\n  root_preload: {root_preload},\n  error\n}};\n");

  let _ = writeln!(out, "export const build_dir = {};", quote(&relative_posix(ctx.cwd, ctx.dest)));
  let _ = writeln!(out, "export const src_dir = {};", quote(&relative_posix(ctx.cwd, ctx.src)));
  let _ = writeln!(out, "export const dev = {};", ctx.dev);
  out
}

/// Import paths for the root layout and error page, falling back to the
/// runtime's defaults copied into the output directory.
fn wrapper_paths(ctx: &AppContext<'_>, internal: &Path) -> (String, String) {
  let resolve = |component: &Component, default: &str| match &component.file {
    Some(file) => import_path(ctx.routes, internal, file),
    None => format!("./{default}"),
  };
  (resolve(&ctx.manifest.root, "layout.svelte"), resolve(&ctx.manifest.error, "error.svelte"))
}

/// `match => ({ id: d(match[1]), rest: d(match[2]).split('/') })`, or `None` without params.
fn params_fn(part: &PagePart) -> Option<String> {
  if part.params.is_empty() {
    return None;
  }
  Some(format!("match => {}", params_object(&part.params)))
}

fn params_body(params: &[String]) -> String {
  if params.is_empty() {
    return "() => ({})".to_string();
  }
  format!("match => {}", params_object(params))
}

fn params_object(params: &[String]) -> String {
  let fields: Vec<String> = params
    .iter()
    .enumerate()
    .map(|(i, param)| match param.strip_prefix("...") {
      Some(name) => format!("{name}: d(match[{}]).split('/')", i + 1),
      None => format!("{param}: d(match[{}])", i + 1),
    })
    .collect();
  format!("({{ {} }})", fields.join(", "))
}

fn page_file(page: &Page) -> Option<&str> {
  page.parts.last().and_then(Option::as_ref).and_then(|p| p.component.file.as_deref())
}

/// Relative module specifier from `from_dir` to `<routes>/<file>`.
fn import_path(routes: &Path, from_dir: &Path, file: &str) -> String {
  let rel = relative_posix(from_dir, &routes.join(file));
  if rel.starts_with("../") { rel } else { format!("./{rel}") }
}

fn relative_posix(from_dir: &Path, to: &Path) -> String {
  let rel = pathdiff::diff_paths(to, from_dir).unwrap_or_else(|| to.to_path_buf());
  rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

fn quote(text: &str) -> String {
  serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Inputs for `<output>/service-worker.js`.
pub struct ServiceWorkerManifest<'a> {
  pub manifest: &'a ManifestData,
  pub output: &'a Path,
  /// Client files to precache, already prefixed with `client/`.
  pub client_files: &'a [String],
  pub static_dir: &'a Path,
}

/// Write the service-worker manifest module and return its path.
pub fn create_serviceworker_manifest(sw: &ServiceWorkerManifest<'_>) -> Result<PathBuf> {
  let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis());
  let files = list_static_files(sw.static_dir)?;

  let mut out = String::from(HEADER);
  let _ = writeln!(out, "export const timestamp = {timestamp};\n");
  let _ = writeln!(out, "export const files = {};", json_array(&files));
  out.push_str("export { files as assets };\n\n");
  let _ = writeln!(out, "export const shell = {};\n", json_array(sw.client_files));
  out.push_str("export const routes = [\n");
  for page in &sw.manifest.pages {
    let _ = writeln!(out, "  {{ pattern: /{}/ }},", page.pattern);
  }
  out.push_str("];\n");

  let path = sw.output.join("service-worker.js");
  std::fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(path)
}

/// Files under the static directory, relative and sorted. A missing directory lists nothing.
fn list_static_files(dir: &Path) -> Result<Vec<String>> {
  if !dir.is_dir() {
    return Ok(Vec::new());
  }
  let mut files = Vec::new();
  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = entry.with_context(|| format!("failed to scan {}", dir.display()))?;
    if entry.file_type().is_file() {
      files.push(relative_posix(dir, entry.path()));
    }
  }
  Ok(files)
}

fn json_array(items: &[String]) -> String {
  if items.is_empty() {
    return "[]".to_string();
  }
  let body: Vec<String> = items.iter().map(|f| format!("\t{}", quote(f))).collect();
  format!("[\n{}\n]", body.join(",\n"))
}
