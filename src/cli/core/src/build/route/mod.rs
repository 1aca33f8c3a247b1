/* src/cli/core/src/build/route/mod.rs */

// Route manifest derivation: walks the routes directory and turns file
// names into ordered page, layout, error and endpoint entries.

mod parts;
mod types;
mod walk;


pub use types::{Component, ManifestData, Page, PagePart};
pub use walk::create_manifest_data;
