/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{find_burrow_config, load_burrow_config};
pub use types::BurrowConfig;
