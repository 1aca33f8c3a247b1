/* src/cli/core/src/build/run/mod.rs */

// Build orchestrator: reset, template, routes, then client, legacy client,
// server and service-worker compiles. Each stage hands its typed output to
// the stages after it; any failure stops the build where it is.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use serde_json::json;

use super::app::{AppContext, ServiceWorkerManifest, create_app, create_serviceworker_manifest};
use super::bundler::{
  CompileResult, Compiler, CompilerMode, create_compilers, has_serviceworker, inject_resources,
};
use super::metadata::BuildMetadata;
use super::output::{self, OutputArea};
use super::route::{ManifestData, create_manifest_data};
use super::target::{BuildOptions, BuildTarget};
use super::template::write_template;
use crate::ui::{self, DIM, RESET};

/// Progress notification fired after each compile stage.
pub struct CompileEvent<'a> {
  /// `client`, `client (legacy)`, `server` or `serviceworker`.
  pub tag: &'static str,
  pub result: &'a CompileResult,
}

/// What a finished build left behind.
#[derive(Debug)]
pub struct BuildReport {
  pub dest: PathBuf,
  pub build_json: PathBuf,
  pub routes: usize,
  /// Client files precached by the service worker, prefixed with `client/`.
  pub client_files: Vec<String>,
  pub serviceworker: Option<PathBuf>,
}

type OnCompile<'f> = dyn FnMut(CompileEvent<'_>) + 'f;

pub async fn build(opts: &BuildOptions) -> Result<BuildReport> {
  build_with(opts, |_| {}).await
}

pub async fn build_with(
  opts: &BuildOptions,
  mut oncompile: impl FnMut(CompileEvent<'_>),
) -> Result<BuildReport> {
  let started = Instant::now();
  let target = BuildTarget::resolve(opts)?;
  let total = if has_serviceworker(&target) { 6 } else { 5 };

  // [1] Reset
  ui::step(1, total, "Resetting output");
  let area = output::reset(&target)?;
  ui::blank();

  // [2] Template
  ui::step(2, total, "Preparing template");
  write_template(&target.cwd, &target.src, &area.dest)?;
  ui::detail_ok("template.html");
  ui::blank();

  // [3] Routes + generated app
  ui::step(3, total, "Deriving routes");
  let manifest = derive_routes(&target, &area)?;
  ui::blank();

  // [4] Client (+ legacy) and build.json
  ui::step(4, total, &format!("Compiling client with {}", target.bundler));
  let compilers = create_compilers(target.bundler, &target, CompilerMode::production());
  let client = client_stage(&target, &area, &manifest, &compilers.client, &mut oncompile).await?;
  ui::blank();

  // [5] Server
  ui::step(5, total, "Compiling server");
  let server = compilers.server.compile().await?;
  inject_emitted(&target, &client.build_json, &area)?;
  report_stage(&server);
  oncompile(CompileEvent { tag: compilers.server.tag(), result: &server });
  ui::blank();

  // [6] Service worker
  let mut serviceworker = None;
  if let Some(compiler) = &compilers.serviceworker {
    ui::step(6, total, "Compiling service worker");
    let sw_manifest = create_serviceworker_manifest(&ServiceWorkerManifest {
      manifest: &manifest,
      output: &area.output,
      client_files: &client.files,
      static_dir: &target.static_dir,
    })?;
    ui::detail_ok(&format!("service-worker.js: {} shell files", client.files.len()));
    let result = compiler.compile().await?;
    inject_emitted(&target, &client.build_json, &area)?;
    report_stage(&result);
    oncompile(CompileEvent { tag: compiler.tag(), result: &result });
    ui::blank();
    serviceworker = Some(sw_manifest);
  }

  let report = BuildReport {
    dest: area.dest,
    build_json: client.build_json,
    routes: manifest.entries().len(),
    client_files: client.files,
    serviceworker,
  };
  print_summary(&report, started);
  Ok(report)
}

fn derive_routes(target: &BuildTarget, area: &OutputArea) -> Result<ManifestData> {
  let manifest = create_manifest_data(&target.routes, target.ext.as_deref())?;
  ui::detail_ok(&format!(
    "{} pages \u{00b7} {} endpoints \u{00b7} {} components",
    manifest.pages.len(),
    manifest.server_routes.len(),
    manifest.components.len(),
  ));

  let written = create_app(&AppContext {
    manifest: &manifest,
    cwd: &target.cwd,
    src: &target.src,
    routes: &target.routes,
    output: &area.output,
    dest: &area.dest,
    dev: false,
  })?;
  for path in &written {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    ui::detail_ok(&name);
  }
  Ok(manifest)
}

/// Output of the client stage that later stages depend on.
struct ClientOutput {
  build_json: PathBuf,
  files: Vec<String>,
}

async fn client_stage(
  target: &BuildTarget,
  area: &OutputArea,
  manifest: &ManifestData,
  compiler: &Compiler,
  oncompile: &mut OnCompile<'_>,
) -> Result<ClientOutput> {
  let mut metadata = BuildMetadata::new();

  let client = compile_client(compiler, oncompile).await?;
  metadata.fold("client", client.to_json(manifest, area))?;

  if target.legacy {
    // a fresh compiler: the legacy signal only reaches this process
    let legacy = create_compilers(target.bundler, target, CompilerMode::legacy()).client;
    let result = compile_client(&legacy, oncompile).await?;
    metadata.fold("legacy_assets", json!(result.assets))?;
  }

  let build_json = metadata.write(&area.dest)?;
  ui::detail_ok("build.json");
  if target.bundler.injects_resources() {
    let count = inject_resources(&build_json, &area.client_dir())?;
    if count > 0 {
      ui::detail(&format!("{DIM}css injected into {count} client files{RESET}"));
    }
  }

  let files = client.client_files().into_iter().map(|f| format!("client/{f}")).collect();
  Ok(ClientOutput { build_json, files })
}

/// Substitute CSS placeholders across both stage directories after a later
/// compile. A rollup config that builds every bundle in one run re-emits the
/// client with raw placeholders; already-injected files are left alone.
fn inject_emitted(target: &BuildTarget, build_json: &Path, area: &OutputArea) -> Result<()> {
  if !target.bundler.injects_resources() {
    return Ok(());
  }
  for dir in [area.client_dir(), area.server_dir()] {
    inject_resources(build_json, &dir)?;
  }
  Ok(())
}

/// Compile one client bundle and announce it.
async fn compile_client(compiler: &Compiler, oncompile: &mut OnCompile<'_>) -> Result<CompileResult> {
  let result = compiler.compile().await?;
  report_stage(&result);
  oncompile(CompileEvent { tag: compiler.tag(), result: &result });
  Ok(result)
}

fn report_stage(result: &CompileResult) {
  for warning in &result.warnings {
    ui::bundler_warning(result.tag, warning);
  }
  ui::stage_done(result.tag, result.chunks.len(), result.total_size(), result.duration);
}

fn print_summary(report: &BuildReport, started: Instant) {
  let elapsed = started.elapsed().as_secs_f64();
  ui::ok(&format!("build complete in {elapsed:.1}s"));
  let sw = if report.serviceworker.is_some() { " \u{00b7} service worker" } else { "" };
  ui::detail(&format!(
    "{} routes \u{00b7} {} client files \u{00b7} {}{sw}",
    report.routes,
    report.client_files.len(),
    report.build_json.display(),
  ));
  ui::detail(&format!("{DIM}output: {}{RESET}", report.dest.display()));
}
