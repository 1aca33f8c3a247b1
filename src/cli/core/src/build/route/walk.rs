/* src/cli/core/src/build/route/walk.rs */

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use super::parts::{Item, Part, compare_items, get_parts, get_pattern, get_slug};
use super::types::{
  Component, ManifestData, Page, PagePart, RouteEntry, RouteKind, ServerRoute,
};
use crate::build::error::BuildError;

const DEFAULT_EXTENSIONS: &str = ".svelte .html";

fn module_script_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?s)<script[^>]*\bcontext\s*=\s*["']module["'][^>]*>(.*?)</script>"#).unwrap()
  })
}

fn preload_export_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"export\s+(?:async\s+)?function\s+preload\b|export\s+(?:const|let|var)\s+preload\b")
      .unwrap()
  })
}

fn alpha_ext_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)^\.[a-z]+$").unwrap())
}

struct Walker<'a> {
  root: &'a Path,
  extensions: Vec<&'a str>,
  components: Vec<Component>,
  pages: Vec<Page>,
  server_routes: Vec<ServerRoute>,
  entries: Vec<RouteEntry>,
}

/// Derive the route manifest from `routes_dir`.
/// `ext` is a whitespace-separated list of page extensions (default `.svelte .html`).
pub fn create_manifest_data(routes_dir: &Path, ext: Option<&str>) -> Result<ManifestData> {
  if !routes_dir.is_dir() {
    return Err(BuildError::RoutesDirMissing(routes_dir.to_path_buf()).into());
  }

  let mut walker = Walker {
    root: routes_dir,
    extensions: ext.unwrap_or(DEFAULT_EXTENSIONS).split_whitespace().collect(),
    components: Vec::new(),
    pages: Vec::new(),
    server_routes: Vec::new(),
    entries: Vec::new(),
  };

  let root = walker.find_layout("_layout", "main", "")?;
  let error = walker.find_layout("_error", "error", "")?;

  walker.walk("", &[], &[], &[])?;

  let root_pattern = get_pattern(&[], true);
  if let Some(file) = root.as_ref().and_then(|c| c.file.clone()) {
    walker.entries.push(RouteEntry {
      pattern: root_pattern.clone(),
      file,
      kind: RouteKind::Layout,
      params: vec![],
    });
  }
  if let Some(file) = error.as_ref().and_then(|c| c.file.clone()) {
    walker.entries.push(RouteEntry {
      pattern: root_pattern,
      file,
      kind: RouteKind::Error,
      params: vec![],
    });
  }

  check_clashes(&walker.pages, &walker.server_routes, &walker.entries)?;

  Ok(ManifestData {
    root: root.unwrap_or_else(|| Component::default_named("_default_layout")),
    error: error.unwrap_or_else(|| Component::default_named("_default_error")),
    components: walker.components,
    pages: walker.pages,
    server_routes: walker.server_routes,
    entries: walker.entries,
  })
}

impl Walker<'_> {
  /// Look for `<dir>/<file_name><ext>` in extension order.
  fn find_layout(&self, file_name: &str, name: &str, dir: &str) -> Result<Option<Component>> {
    for ext in &self.extensions {
      let file = join_posix(dir, &format!("{file_name}{ext}"));
      if self.root.join(&file).is_file() {
        let has_preload = self.has_preload(&file)?;
        return Ok(Some(Component { name: name.to_string(), file: Some(file), has_preload }));
      }
    }
    Ok(None)
  }

  fn has_preload(&self, file: &str) -> Result<bool> {
    let source = std::fs::read_to_string(self.root.join(file))?;
    if !source.contains("preload") {
      return Ok(false);
    }
    Ok(
      module_script_re()
        .captures_iter(&source)
        .any(|cap| preload_export_re().is_match(&cap[1])),
    )
  }

  fn read_items(&self, dir: &str) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    for entry in std::fs::read_dir(self.root.join(dir))? {
      let entry = entry?;
      let basename = entry.file_name().to_string_lossy().into_owned();
      if basename.starts_with('_') {
        continue;
      }
      if basename.starts_with('.') && basename != ".well-known" {
        continue;
      }
      let is_dir = entry.file_type()?.is_dir();
      let ext = if is_dir { "" } else { extension_of(&basename) };
      if !is_dir && !alpha_ext_re().is_match(ext) {
        continue;
      }

      let file = join_posix(dir, &basename);
      let segment = &basename[..basename.len() - ext.len()];
      let parts = get_parts(segment, &file)?;
      let route_suffix = if is_dir {
        String::new()
      } else {
        segment.find('.').map(|i| segment[i..].to_string()).unwrap_or_default()
      };

      items.push(Item {
        is_index: !is_dir && basename.starts_with("index."),
        is_page: !is_dir && self.extensions.iter().any(|e| *e == ext),
        basename,
        file,
        parts,
        is_dir,
        route_suffix,
      });
    }
    items.sort_by(compare_items);
    Ok(items)
  }

  fn walk(
    &mut self,
    dir: &str,
    parent_segments: &[Vec<Part>],
    parent_params: &[String],
    stack: &[Option<PagePart>],
  ) -> Result<()> {
    for item in self.read_items(dir)? {
      let segments = extend_segments(parent_segments, &item);

      let mut params = parent_params.to_vec();
      params.extend(item.parts.iter().filter(|p| p.dynamic).map(|p| p.content.clone()));

      if item.is_dir {
        let layout_name = format!("{}__layout", get_slug(&item.file));
        let layout = self.find_layout("_layout", &layout_name, &item.file)?;
        let mut child_stack = stack.to_vec();
        match &layout {
          Some(component) => {
            self.components.push(component.clone());
            child_stack.push(Some(PagePart { component: component.clone(), params: params.clone() }));
          }
          None => child_stack.push(None),
        }

        self.walk(&item.file, &segments, &params, &child_stack)?;

        if let Some(Component { file: Some(file), .. }) = layout {
          self.entries.push(RouteEntry {
            pattern: get_pattern(&segments, true),
            file,
            kind: RouteKind::Layout,
            params: display_params(&params),
          });
        }
      } else if item.is_page {
        let component = Component {
          name: get_slug(&item.file),
          file: Some(item.file.clone()),
          has_preload: self.has_preload(&item.file)?,
        };
        self.components.push(component.clone());

        let part = PagePart { component, params: params.clone() };
        let mut parts = stack.to_vec();
        if item.is_index && matches!(parts.last(), Some(None)) {
          parts.pop();
        }
        parts.push(Some(part));

        let pattern = get_pattern(&segments, true);
        self.entries.push(RouteEntry {
          pattern: pattern.clone(),
          file: item.file.clone(),
          kind: RouteKind::Page,
          params: display_params(&params),
        });
        self.pages.push(Page { pattern, parts });
      } else {
        let pattern = get_pattern(&segments, item.route_suffix.is_empty());
        self.entries.push(RouteEntry {
          pattern: pattern.clone(),
          file: item.file.clone(),
          kind: RouteKind::Endpoint,
          params: display_params(&params),
        });
        self.server_routes.push(ServerRoute {
          name: format!("route_{}", get_slug(&item.file)),
          pattern,
          file: item.file,
          params,
        });
      }
    }
    Ok(())
  }
}

/// Segments for `item`: index files map onto their parent, with any
/// `index.json.js`-style suffix appended to the parent's last part.
fn extend_segments(parent: &[Vec<Part>], item: &Item) -> Vec<Vec<Part>> {
  let mut segments = parent.to_vec();
  if !item.is_index {
    segments.push(item.parts.clone());
    return segments;
  }
  if item.route_suffix.is_empty() {
    return segments;
  }
  let suffix_part = Part {
    content: item.route_suffix.clone(),
    dynamic: false,
    spread: false,
    qualifier: None,
  };
  match segments.last_mut() {
    Some(last_segment) => match last_segment.last_mut() {
      Some(last_part) if !last_part.dynamic => last_part.content.push_str(&item.route_suffix),
      _ => last_segment.push(suffix_part),
    },
    None => segments.push(item.parts.clone()),
  }
  segments
}

fn check_clashes(
  pages: &[Page],
  server_routes: &[ServerRoute],
  entries: &[RouteEntry],
) -> Result<(), BuildError> {
  let mut seen_pages: HashMap<&str, &str> = HashMap::new();
  for page in pages {
    let file = page_file(page);
    if let Some(other) = seen_pages.insert(&page.pattern, file) {
      return Err(BuildError::RouteClash {
        kind: "pages",
        first: other.to_string(),
        second: file.to_string(),
      });
    }
  }

  let mut seen_routes: HashMap<&str, &str> = HashMap::new();
  for route in server_routes {
    if let Some(other) = seen_routes.insert(&route.pattern, &route.file) {
      return Err(BuildError::RouteClash {
        kind: "routes",
        first: other.to_string(),
        second: route.file.clone(),
      });
    }
  }

  // sibling dynamic directories with their own _layout share a pattern
  let mut seen_layouts: HashMap<&str, &str> = HashMap::new();
  for entry in entries.iter().filter(|e| e.kind == RouteKind::Layout) {
    if let Some(other) = seen_layouts.insert(&entry.pattern, &entry.file) {
      return Err(BuildError::RouteClash {
        kind: "layouts",
        first: other.to_string(),
        second: entry.file.clone(),
      });
    }
  }
  Ok(())
}

fn page_file(page: &Page) -> &str {
  page
    .parts
    .last()
    .and_then(|p| p.as_ref())
    .and_then(|p| p.component.file.as_deref())
    .unwrap_or_default()
}

fn display_params(params: &[String]) -> Vec<String> {
  params.iter().map(|p| p.trim_start_matches("...").to_string()).collect()
}

/// `.js` for `about.js`, `.js` for `[slug].json.js`, empty for dotfiles and bare names.
fn extension_of(basename: &str) -> &str {
  match basename.rfind('.') {
    Some(i) if i > 0 => &basename[i..],
    _ => "",
  }
}

fn join_posix(dir: &str, name: &str) -> String {
  if dir.is_empty() { name.to_string() } else { format!("{dir}/{name}") }
}
