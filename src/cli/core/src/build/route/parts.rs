/* src/cli/core/src/build/route/parts.rs */

// Segment syntax: `[name]`, `[...rest]`, `[id([0-9]+)]`, mixed with static text.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::build::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Part {
  pub content: String,
  pub dynamic: bool,
  pub spread: bool,
  pub qualifier: Option<String>,
}

fn param_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\[(.+?\(.+?\)|.+?)\]").unwrap())
}

fn param_body_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"^([^(]+)(\(.+\))?$").unwrap())
}

fn first_param_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\[([^(]+)(?:\([^(]+\))?\]").unwrap())
}

fn non_ident_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_$]").unwrap())
}

fn extension_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\.\w+$").unwrap())
}

/// Split one path segment into static and dynamic parts.
pub(super) fn get_parts(segment: &str, file: &str) -> Result<Vec<Part>, BuildError> {
  if segment.contains("][") {
    return Err(BuildError::InvalidRoute {
      file: file.to_string(),
      reason: "parameters must be separated",
    });
  }

  let mut parts = Vec::new();
  let mut last = 0;
  for cap in param_re().captures_iter(segment) {
    let Some(whole) = cap.get(0) else { continue };
    if whole.start() > last {
      parts.push(static_part(&segment[last..whole.start()]));
    }
    last = whole.end();

    let inner = &cap[1];
    let Some(body) = param_body_re().captures(inner) else {
      return Err(BuildError::InvalidRoute {
        file: file.to_string(),
        reason: "parameter names cannot start with (",
      });
    };
    let content = body[1].to_string();
    let qualifier = body.get(2).map(|m| m.as_str().to_string());
    if let Some(q) = &qualifier
      && q[1..q.len() - 1].contains(['(', ')', '?', ':'])
    {
      return Err(BuildError::InvalidRoute {
        file: file.to_string(),
        reason: "cannot use (, ), ? or : in route qualifiers",
      });
    }
    let spread = content.len() > 3 && content.starts_with("...");
    parts.push(Part { content, dynamic: true, spread, qualifier });
  }
  if last < segment.len() {
    parts.push(static_part(&segment[last..]));
  }
  Ok(parts)
}

fn static_part(text: &str) -> Part {
  Part { content: text.to_string(), dynamic: false, spread: false, qualifier: None }
}

/// Build the JS regex source matching a sequence of segments.
pub(super) fn get_pattern(segments: &[Vec<Part>], add_trailing_slash: bool) -> String {
  let path = segments
    .iter()
    .map(|segment| {
      segment
        .iter()
        .map(|part| {
          if part.dynamic {
            match &part.qualifier {
              Some(q) => q.clone(),
              None if part.spread => "(.+)".to_string(),
              None => r"([^\/]+?)".to_string(),
            }
          } else {
            escape_regex(&encode_uri(&part.content))
          }
        })
        .collect::<String>()
    })
    .collect::<Vec<_>>()
    .join(r"\/");

  let trailing = if add_trailing_slash && !segments.is_empty() { r"\/?$" } else { "$" };
  format!(r"^\/{path}{trailing}")
}

/// Percent-encode like `encodeURI`, except `?` and `#` are also encoded and
/// square brackets are kept literal.
fn encode_uri(text: &str) -> String {
  const KEEP: &str = "-_.!~*'();/:@&=+$,[]";
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if c.is_ascii_alphanumeric() || KEEP.contains(c) {
      out.push(c);
    } else {
      let mut buf = [0u8; 4];
      for byte in c.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{byte:02X}"));
      }
    }
  }
  out
}

fn escape_regex(text: &str) -> String {
  const SPECIAL: &str = r".*+?^${}()|[]\";
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if SPECIAL.contains(c) {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

const RESERVED_WORDS: &[&str] = &[
  "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
  "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
  "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
  "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
  "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// JS-safe identifier for a routes-relative file: `posts/[id].svelte` -> `posts_$id`.
pub(super) fn get_slug(file: &str) -> String {
  let name = file.replacen("/index", "", 1);
  let name = name.replace('/', "_");
  let name = extension_re().replace(&name, "");
  let name = first_param_re().replace(&name, "$$${1}");
  let mut name = non_ident_re()
    .replace_all(&name, |caps: &Captures| {
      let c = caps[0].chars().next().unwrap_or('_');
      if c == '.' { "_".to_string() } else { format!("${}", c as u32) }
    })
    .into_owned();
  if RESERVED_WORDS.contains(&name.as_str()) {
    name.push('_');
  }
  name
}

/// One directory entry considered during the walk.
#[derive(Debug, Clone)]
pub(super) struct Item {
  pub basename: String,
  pub file: String,
  pub parts: Vec<Part>,
  pub is_dir: bool,
  pub is_index: bool,
  pub is_page: bool,
  pub route_suffix: String,
}

impl Item {
  fn is_spread(&self) -> bool {
    self.file.contains("[...")
  }
}

/// Sibling order, most specific first. Total: ties fall back to the basename.
pub(super) fn compare_items(a: &Item, b: &Item) -> Ordering {
  if a.is_index != b.is_index {
    return match (a.is_index, a.is_spread(), b.is_spread()) {
      (true, true, _) => Ordering::Greater,
      (true, false, _) => Ordering::Less,
      (false, _, true) => Ordering::Less,
      (false, _, false) => Ordering::Greater,
    };
  }

  let max = a.parts.len().max(b.parts.len());
  for i in 0..max {
    let (Some(ap), Some(bp)) = (a.parts.get(i), b.parts.get(i)) else {
      // the item with more parts is more specific
      return if a.parts.len() < b.parts.len() { Ordering::Greater } else { Ordering::Less };
    };
    let ord = compare_parts(ap, bp);
    if ord != Ordering::Equal {
      return ord;
    }
  }

  a.basename.cmp(&b.basename)
}

fn compare_parts(a: &Part, b: &Part) -> Ordering {
  if a.spread != b.spread {
    return if a.spread { Ordering::Greater } else { Ordering::Less };
  }
  if a.dynamic != b.dynamic {
    return if a.dynamic { Ordering::Greater } else { Ordering::Less };
  }
  if !a.dynamic {
    if a.content == b.content {
      return Ordering::Equal;
    }
    let (a_len, b_len) = (a.content.chars().count(), b.content.chars().count());
    return b_len.cmp(&a_len).then_with(|| a.content.cmp(&b.content));
  }
  match (&a.qualifier, &b.qualifier) {
    (None, Some(_)) => Ordering::Greater,
    (Some(_), None) => Ordering::Less,
    (Some(aq), Some(bq)) => bq.len().cmp(&aq.len()).then_with(|| aq.cmp(bq)),
    (None, None) => Ordering::Equal,
  }
}
