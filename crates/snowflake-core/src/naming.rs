//! Reserved names and the mapping between logical and physical identifiers.
//!
//! Physical column names carry their scalar type as a suffix
//! (`name.$string`), so one field may own a column per type. Physical table
//! names are the fact name joined with the table's nesting path.

use crate::{column::ScalarType, path};

/// Names starting with this prefix belong to the schema manager.
pub const RESERVED_PREFIX: &str = "__";

/// Surrogate row id, present in every table.
pub const UID: &str = "__id__";

/// Surrogate id of the owning row in the parent table.
pub const PARENT: &str = "__parent__";

/// Position of a child row within its parent's array.
pub const ORDER: &str = "__order__";

/// Id field sentinel meaning "no document id; use the surrogate only".
pub const GUID: &str = "_id";

const TYPE_MARKER: &str = ".$";

pub fn is_reserved(name: &str) -> bool { name.starts_with(RESERVED_PREFIX) }

/// Encode a field name and scalar type into a physical column name.
pub fn typed_column(name: &str, scalar_type: ScalarType) -> String {
  format!("{name}{TYPE_MARKER}{scalar_type}")
}

/// Inverse of [`typed_column`]. Names without a recognised type suffix come
/// back whole, with no type.
pub fn untyped_column(physical: &str) -> (&str, Option<ScalarType>) {
  match physical.rsplit_once(TYPE_MARKER) {
    Some((name, suffix)) => match suffix.parse() {
      Ok(ty) => (name, Some(ty)),
      Err(_) => (physical, None),
    },
    None => (physical, None),
  }
}

/// Physical table name for the table at nesting path `table_path`.
pub fn physical_table_name(fact: &str, table_path: &str) -> String {
  path::concat_field(fact, table_path)
}

/// Nesting path of the physical table `table_name`, if it belongs to `fact`.
pub fn table_path_of(fact: &str, table_name: &str) -> Option<String> {
  if table_name == fact {
    return Some(path::ROOT.to_owned());
  }
  table_name
    .strip_prefix(fact)
    .and_then(|rest| rest.strip_prefix('.'))
    .filter(|rest| !rest.is_empty())
    .map(str::to_owned)
}

/// Double-quote an SQL identifier.
pub fn quote(identifier: &str) -> String {
  format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn typed_column_roundtrip() {
    let physical = typed_column("a.b", ScalarType::Number);
    assert_eq!(physical, "a.b.$number");
    assert_eq!(untyped_column(&physical), ("a.b", Some(ScalarType::Number)));
  }

  #[test]
  fn untyped_column_without_suffix() {
    assert_eq!(untyped_column("legacy"), ("legacy", None));
    assert_eq!(untyped_column("price.$usd"), ("price.$usd", None));
  }

  #[test]
  fn table_names() {
    assert_eq!(physical_table_name("people", "."), "people");
    assert_eq!(physical_table_name("people", "tags"), "people.tags");
    assert_eq!(table_path_of("people", "people").as_deref(), Some("."));
    assert_eq!(
      table_path_of("people", "people.tags.links").as_deref(),
      Some("tags.links")
    );
    assert_eq!(table_path_of("people", "peoplex"), None);
    assert_eq!(table_path_of("people", "orders"), None);
  }

  #[test]
  fn quoting_doubles_quotes() {
    assert_eq!(quote("people.tags"), "\"people.tags\"");
    assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
  }

  #[test]
  fn reserved_prefix() {
    assert!(is_reserved(UID));
    assert!(is_reserved(PARENT));
    assert!(is_reserved(ORDER));
    assert!(!is_reserved(GUID));
  }
}
