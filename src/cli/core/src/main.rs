/* src/cli/core/src/main.rs */

mod build;
mod clean;
mod config;
mod shell;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use build::{BuildOptions, CompileEvent};
use config::{BurrowConfig, find_burrow_config, load_burrow_config};

#[derive(Parser)]
#[command(name = "burrow", about = "Burrow build CLI")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Compile the app into a deployable bundle
  Build {
    /// Path to burrow.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Source directory
    #[arg(long)]
    src: Option<PathBuf>,
    /// Routes directory
    #[arg(long)]
    routes: Option<PathBuf>,
    /// Directory for generated runtime modules
    #[arg(long)]
    output: Option<PathBuf>,
    /// Static assets directory
    #[arg(long = "static")]
    static_dir: Option<PathBuf>,
    /// Destination directory for the build
    #[arg(short, long)]
    dest: Option<PathBuf>,
    /// Bundler to use: rollup or webpack (inferred from config files if omitted)
    #[arg(short, long)]
    bundler: Option<String>,
    /// Also build a client bundle for older browsers (rollup only)
    #[arg(long)]
    legacy: bool,
    /// Page file extensions, e.g. ".svelte .html"
    #[arg(long)]
    ext: Option<String>,
    /// Skip the per-file listing after each compile stage
    #[arg(short, long)]
    quiet: bool,
  },
  /// Remove the build destination and generated runtime modules
  Clean {
    /// Path to burrow.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Destination directory to remove
    #[arg(short, long)]
    dest: Option<PathBuf>,
    /// Generated output directory to remove
    #[arg(long)]
    output: Option<PathBuf>,
  },
}

/// Resolve config (explicit path, or searched upward from cwd) and the project root.
/// A project without burrow.toml builds from the current directory with defaults.
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, BurrowConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      match find_burrow_config(&cwd) {
        Ok(p) => p,
        Err(_) => return Ok((cwd, BurrowConfig::default())),
      }
    }
  };
  let config = load_burrow_config(&path)?;
  let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
  Ok((base_dir, config))
}

/// List what a compile stage emitted, source maps excluded.
fn print_compile(event: CompileEvent<'_>) {
  for chunk in event.result.chunks.iter().filter(|c| !c.is_source_map()) {
    ui::bundle_file(event.tag, &chunk.file, chunk.size);
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Build {
      config,
      src,
      routes,
      output,
      static_dir,
      dest,
      bundler,
      legacy,
      ext,
      quiet,
    } => {
      let (base_dir, burrow_config) = resolve_config(config)?;
      ui::banner("build", burrow_config.project.name.as_deref());

      let mut opts = BuildOptions::from_config(&base_dir, &burrow_config);
      opts.src = src.or(opts.src);
      opts.routes = routes.or(opts.routes);
      opts.output = output.or(opts.output);
      opts.static_dir = static_dir.or(opts.static_dir);
      opts.dest = dest.or(opts.dest);
      opts.bundler = bundler.or(opts.bundler);
      opts.legacy |= legacy;
      opts.ext = ext.or(opts.ext);

      let result =
        if quiet { build::build(&opts).await } else { build::build_with(&opts, print_compile).await };
      if let Err(e) = result {
        ui::fail("build failed");
        return Err(e);
      }
    }
    Command::Clean { config, dest, output } => {
      let (base_dir, burrow_config) = resolve_config(config)?;
      let mut opts = BuildOptions::from_config(&base_dir, &burrow_config);
      opts.dest = dest.or(opts.dest);
      opts.output = output.or(opts.output);
      clean::run_clean(&opts)?;
    }
  }

  Ok(())
}
