//! Dotted field paths.
//!
//! A field path is a `.`-separated list of names from the document root. The
//! root itself is written `"."`. Table nesting paths use the same notation:
//! the fact table lives at `"."` and every child table at the dotted name of
//! the array it materialises.

/// The root path.
pub const ROOT: &str = ".";

pub fn is_root(path: &str) -> bool { path.is_empty() || path == ROOT }

/// Spell the root as `"."`; other paths pass through.
pub fn normalize(path: String) -> String {
  if path.is_empty() { ROOT.to_owned() } else { path }
}

pub fn split_field(field: &str) -> Vec<&str> {
  if is_root(field) {
    return Vec::new();
  }
  field.split('.').collect()
}

pub fn join_field<S: AsRef<str>>(parts: &[S]) -> String {
  if parts.is_empty() {
    return ROOT.to_owned();
  }
  parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(".")
}

/// Append `suffix` to `prefix`; either side may be the root.
pub fn concat_field(prefix: &str, suffix: &str) -> String {
  match (is_root(prefix), is_root(suffix)) {
    (true, true) => ROOT.to_owned(),
    (true, false) => suffix.to_owned(),
    (false, true) => prefix.to_owned(),
    (false, false) => format!("{prefix}.{suffix}"),
  }
}

/// True if `field` is `prefix` or lies underneath it.
pub fn starts_with_field(field: &str, prefix: &str) -> bool {
  if is_root(prefix) {
    return true;
  }
  field == prefix
    || field
      .strip_prefix(prefix)
      .is_some_and(|rest| rest.starts_with('.'))
}

/// The name of `field` as seen from the table at `parent`.
///
/// Fields under `parent` lose that prefix (`parent` itself becomes `"."`).
/// Fields elsewhere climb with one leading `.` per level, so
/// `relative_field("name", "tags") == "..name"`.
pub fn relative_field(field: &str, parent: &str) -> String {
  if is_root(parent) {
    return field.to_owned();
  }

  let field_path = split_field(field);
  let parent_path = split_field(parent);
  let common = field_path
    .iter()
    .zip(&parent_path)
    .take_while(|(f, p)| f == p)
    .count();

  let rest = &field_path[common..];
  let up = parent_path.len() - common;
  if up == 0 {
    return join_field(rest);
  }

  let dots = ".".repeat(up + 1);
  if rest.is_empty() { dots } else { format!("{dots}{}", rest.join(".")) }
}

/// Every ancestor of `path`, nearest first, ending at the root.
pub fn ancestors(path: &str) -> Vec<String> {
  let parts = split_field(path);
  (0..parts.len()).rev().map(|n| join_field(&parts[..n])).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_and_join_root() {
    assert!(split_field(".").is_empty());
    assert_eq!(join_field::<&str>(&[]), ".");
    assert_eq!(split_field("a.b.c"), vec!["a", "b", "c"]);
    assert_eq!(join_field(&["a", "b"]), "a.b");
  }

  #[test]
  fn empty_path_normalizes_to_root() {
    assert_eq!(normalize(String::new()), ".");
    assert_eq!(normalize("tags".into()), "tags");
  }

  #[test]
  fn concat_skips_root() {
    assert_eq!(concat_field("people", "."), "people");
    assert_eq!(concat_field("people", "tags"), "people.tags");
    assert_eq!(concat_field(".", "tags"), "tags");
  }

  #[test]
  fn starts_with_respects_segment_boundaries() {
    assert!(starts_with_field("tags", "tags"));
    assert!(starts_with_field("tags.name", "tags"));
    assert!(!starts_with_field("tagsx", "tags"));
    assert!(!starts_with_field("tag", "tags"));
    assert!(starts_with_field("anything", "."));
  }

  #[test]
  fn relative_names() {
    assert_eq!(relative_field("name", "."), "name");
    assert_eq!(relative_field("tags", "tags"), ".");
    assert_eq!(relative_field("tags.label", "tags"), "label");
    assert_eq!(relative_field("name", "tags"), "..name");
    assert_eq!(relative_field("a.x", "a.b"), "..x");
    assert_eq!(relative_field("a", "a.b"), "..");
    assert_eq!(relative_field("z", "a.b"), "...z");
  }

  #[test]
  fn ancestors_nearest_first() {
    assert_eq!(ancestors("a.b.c"), vec!["a.b", "a", "."]);
    assert_eq!(ancestors("tags"), vec!["."]);
    assert!(ancestors(".").is_empty());
  }
}
