//! Per-table projections of the column registry.

use std::collections::HashMap;

use crate::{
  Error, Result,
  column::{Column, ColumnId},
};

// ─── Schema ──────────────────────────────────────────────────────────────────

/// Every column in the snowflake as seen from one table: relative field name
/// to the columns (one per scalar type) reachable at that name.
///
/// Cloning copies the per-name lists; the columns themselves stay in the
/// registry, so a clone can be mutated speculatively without touching the
/// live projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
  table_path: String,
  entries:    Vec<(String, Vec<ColumnId>)>,
  index:      HashMap<String, usize>,
}

impl Schema {
  pub fn new(table_path: impl Into<String>) -> Self {
    Self {
      table_path: table_path.into(),
      entries:    Vec::new(),
      index:      HashMap::new(),
    }
  }

  pub fn table_path(&self) -> &str { &self.table_path }

  /// File `column` under `relative_name`.
  ///
  /// The name must be the one the column itself records for this table;
  /// anything else means the model is corrupt.
  pub fn add(
    &mut self,
    relative_name: &str,
    id: ColumnId,
    column: &Column,
  ) -> Result<()> {
    let expected = column.name_in(&self.table_path);
    if expected != Some(relative_name) {
      return Err(Error::NameMismatch {
        table:    self.table_path.clone(),
        expected: expected.unwrap_or_default().to_owned(),
        found:    relative_name.to_owned(),
      });
    }

    match self.index.get(relative_name) {
      Some(&slot) => self.entries[slot].1.push(id),
      None => {
        self.index.insert(relative_name.to_owned(), self.entries.len());
        self.entries.push((relative_name.to_owned(), vec![id]));
      }
    }
    Ok(())
  }

  /// Columns at `relative_name`; empty when nothing lives there.
  pub fn get(&self, relative_name: &str) -> &[ColumnId] {
    self
      .index
      .get(relative_name)
      .map(|&slot| self.entries[slot].1.as_slice())
      .unwrap_or_default()
  }

  /// The name of `column` from this table's point of view.
  pub fn get_column_name<'c>(&self, column: &'c Column) -> Option<&'c str> {
    column.name_in(&self.table_path)
  }

  /// Relative names in the order they were first seen.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(name, _)| name.as_str())
  }

  /// Every column id, grouped by name in insertion order.
  pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
    self.entries.iter().flat_map(|(_, ids)| ids.iter().copied())
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// A physical row container, identified by its nesting path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
  path:   String,
  schema: Schema,
}

impl Table {
  pub fn new(path: impl Into<String>) -> Self {
    let path = path.into();
    Self { schema: Schema::new(path.clone()), path }
  }

  pub fn path(&self) -> &str { &self.path }

  pub fn schema(&self) -> &Schema { &self.schema }

  pub(crate) fn schema_mut(&mut self) -> &mut Schema { &mut self.schema }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::column::ScalarType;

  fn named(abs: &str, ty: ScalarType, table: &str, rel: &str) -> Column {
    let mut column = Column::new(abs, ty, ".");
    column.names.insert(table.to_owned(), rel.to_owned());
    column
  }

  #[test]
  fn add_groups_types_under_one_name() {
    let mut schema = Schema::new(".");
    let s = named("age", ScalarType::String, ".", "age");
    let i = named("age", ScalarType::Integer, ".", "age");
    schema.add("age", ColumnId(0), &s).unwrap();
    schema.add("age", ColumnId(1), &i).unwrap();

    assert_eq!(schema.get("age"), &[ColumnId(0), ColumnId(1)]);
    assert_eq!(schema.len(), 1);
    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["age"]);
  }

  #[test]
  fn unknown_name_is_empty() {
    let schema = Schema::new(".");
    assert!(schema.get("missing").is_empty());
  }

  #[test]
  fn mismatched_name_is_rejected() {
    let mut schema = Schema::new("tags");
    let column = named("tags.label", ScalarType::String, "tags", "label");
    let err = schema.add("tags.label", ColumnId(0), &column).unwrap_err();
    assert!(matches!(err, Error::NameMismatch { .. }));
    assert!(err.is_invariant_violation());
    assert!(schema.is_empty());
  }

  #[test]
  fn clone_is_independent() {
    let mut live = Schema::new(".");
    let name = named("name", ScalarType::String, ".", "name");
    live.add("name", ColumnId(0), &name).unwrap();

    let mut copy = live.clone();
    assert_eq!(copy, live);

    let other = named("name", ScalarType::Number, ".", "name");
    copy.add("name", ColumnId(1), &other).unwrap();
    assert_eq!(live.get("name"), &[ColumnId(0)]);
    assert_eq!(copy.get("name"), &[ColumnId(0), ColumnId(1)]);
  }

  #[test]
  fn get_column_name_reads_column_names() {
    let schema = Schema::new("tags");
    let column = named("name", ScalarType::String, "tags", "..name");
    assert_eq!(schema.get_column_name(&column), Some("..name"));
  }
}
