/* src/cli/core/src/build/mod.rs */

mod app;
pub mod bundler;
pub mod error;
mod metadata;
pub mod output;
pub mod route;
pub mod run;
pub mod target;
mod template;

pub use run::{CompileEvent, build, build_with};
pub use target::BuildOptions;
