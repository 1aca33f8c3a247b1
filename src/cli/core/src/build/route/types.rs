/* src/cli/core/src/build/route/types.rs */

use serde::Serialize;

/// A renderable module: a page or a layout/error wrapper.
/// `file` is relative to the routes directory; `None` marks the framework default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
  pub name: String,
  pub file: Option<String>,
  pub has_preload: bool,
}

impl Component {
  pub(super) fn default_named(name: &str) -> Self {
    Self { name: name.to_string(), file: None, has_preload: false }
  }
}

/// One level of the layout stack that renders a page. Params are the names
/// captured up to this level; spread params keep their `...` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePart {
  pub component: Component,
  pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
  pub pattern: String,
  /// `None` marks a directory without its own `_layout`.
  pub parts: Vec<Option<PagePart>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRoute {
  pub name: String,
  pub pattern: String,
  pub file: String,
  pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
  Page,
  Layout,
  Error,
  Endpoint,
}

/// Flat view of one routable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
  pub pattern: String,
  pub file: String,
  pub kind: RouteKind,
  pub params: Vec<String>,
}

/// Everything derived from the routes directory, shared read-only by later stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestData {
  pub root: Component,
  pub error: Component,
  pub components: Vec<Component>,
  pub pages: Vec<Page>,
  pub server_routes: Vec<ServerRoute>,
  /// Most specific first: pages and endpoints in walk order, each directory's
  /// layout after its children, the root layout and error page last.
  pub(super) entries: Vec<RouteEntry>,
}

impl ManifestData {
  pub fn entries(&self) -> &[RouteEntry] {
    &self.entries
  }

  /// Component files in manifest order, skipping framework defaults.
  pub fn component_files(&self) -> impl Iterator<Item = (&str, &str)> {
    self.components.iter().filter_map(|c| c.file.as_deref().map(|f| (c.name.as_str(), f)))
  }
}
