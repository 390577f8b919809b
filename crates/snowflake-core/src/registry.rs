//! The column registry: every column and table of one snowflake.
//!
//! Columns live in an arena addressed by [`ColumnId`]; tables and their
//! schemas hold ids only, so moving a column to another table is one update
//! visible to every projection. Tables are kept in registration order
//! (parents before children) alongside a path index.

use std::collections::HashMap;

use crate::{
  Error, Result,
  column::{Column, ColumnId, ScalarType},
  path::relative_field,
  schema::Table,
};

#[derive(Debug, Clone, Default)]
pub struct Registry {
  columns:     Vec<Column>,
  tables:      Vec<Table>,
  table_index: HashMap<String, usize>,
}

impl Registry {
  pub fn new() -> Self { Self::default() }

  /// Register a table at `path` and file every existing column into its
  /// schema.
  pub fn register_table(&mut self, path: &str) -> Result<()> {
    if self.table_index.contains_key(path) {
      return Err(Error::DuplicateTable(path.to_owned()));
    }

    let mut table = Table::new(path);
    for (i, column) in self.columns.iter_mut().enumerate() {
      let relative = relative_field(&column.absolute_name, path);
      column.names.insert(path.to_owned(), relative.clone());
      table.schema_mut().add(&relative, ColumnId(i), column)?;
    }

    self.table_index.insert(path.to_owned(), self.tables.len());
    self.tables.push(table);
    Ok(())
  }

  /// Append `column` and file it into the schema of every registered table.
  pub fn register_column(&mut self, mut column: Column) -> Result<ColumnId> {
    if self
      .find_column(&column.absolute_name, column.scalar_type)
      .is_some()
    {
      return Err(Error::DuplicateColumn {
        name:        column.absolute_name,
        scalar_type: column.scalar_type,
      });
    }

    let id = ColumnId(self.columns.len());
    column.names = self
      .tables
      .iter()
      .map(|t| {
        (t.path().to_owned(), relative_field(&column.absolute_name, t.path()))
      })
      .collect();

    for table in &mut self.tables {
      let relative = column.names[table.path()].clone();
      table.schema_mut().add(&relative, id, &column)?;
    }

    self.columns.push(column);
    Ok(id)
  }

  /// Make `new_path` the current table of column `id`, keeping its history.
  pub(crate) fn rehome(&mut self, id: ColumnId, new_path: &str) {
    self.columns[id.0].nested_path.insert(0, new_path.to_owned());
  }

  pub fn find_column(
    &self,
    absolute_name: &str,
    scalar_type: ScalarType,
  ) -> Option<ColumnId> {
    self
      .columns
      .iter()
      .position(|c| {
        c.absolute_name == absolute_name && c.scalar_type == scalar_type
      })
      .map(ColumnId)
  }

  pub fn column(&self, id: ColumnId) -> &Column { &self.columns[id.0] }

  /// Columns with their ids, in discovery order.
  pub fn columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> {
    self.columns.iter().enumerate().map(|(i, c)| (ColumnId(i), c))
  }

  pub fn column_count(&self) -> usize { self.columns.len() }

  pub fn table(&self, path: &str) -> Option<&Table> {
    self.table_index.get(path).map(|&i| &self.tables[i])
  }

  /// Tables, parents before children.
  pub fn tables(&self) -> &[Table] { &self.tables }

  /// Columns reachable at `relative_name` from the table at `table_path`.
  pub fn lookup(&self, table_path: &str, relative_name: &str) -> Vec<&Column> {
    self
      .table(table_path)
      .map(|t| {
        t.schema()
          .get(relative_name)
          .iter()
          .map(|&id| self.column(id))
          .collect()
      })
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn string(name: &str, table: &str) -> Column {
    Column::new(name, ScalarType::String, table)
  }

  #[test]
  fn column_before_table_is_backfilled() {
    let mut registry = Registry::new();
    registry.register_table(".").unwrap();
    registry.register_column(string("tags.label", ".")).unwrap();
    registry.register_table("tags").unwrap();

    let found = registry.lookup("tags", "label");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].absolute_name, "tags.label");
    assert_eq!(registry.lookup(".", "tags.label").len(), 1);
  }

  #[test]
  fn table_before_column_is_updated() {
    let mut registry = Registry::new();
    registry.register_table(".").unwrap();
    registry.register_table("tags").unwrap();
    registry.register_column(string("name", ".")).unwrap();

    assert_eq!(registry.lookup("tags", "..name").len(), 1);
    assert_eq!(registry.lookup(".", "name").len(), 1);
  }

  #[test]
  fn duplicates_are_rejected() {
    let mut registry = Registry::new();
    registry.register_table(".").unwrap();
    assert!(matches!(
      registry.register_table("."),
      Err(Error::DuplicateTable(_))
    ));

    registry.register_column(string("name", ".")).unwrap();
    registry
      .register_column(Column::new("name", ScalarType::Integer, "."))
      .unwrap();
    assert!(matches!(
      registry.register_column(string("name", ".")),
      Err(Error::DuplicateColumn { .. })
    ));
    assert_eq!(registry.column_count(), 2);
  }

  #[test]
  fn names_agree_with_every_schema() {
    let mut registry = Registry::new();
    registry.register_table(".").unwrap();
    registry.register_column(string("name", ".")).unwrap();
    registry.register_table("tags").unwrap();
    registry.register_column(string("tags.label", "tags")).unwrap();
    registry.register_table("tags.links").unwrap();

    for table in registry.tables() {
      for (id, column) in registry.columns() {
        let name = table.schema().get_column_name(column).unwrap();
        assert_eq!(Some(name), column.name_in(table.path()));
        assert!(table.schema().get(name).contains(&id));
      }
    }
  }

  #[test]
  fn rehome_keeps_history() {
    let mut registry = Registry::new();
    registry.register_table(".").unwrap();
    let id = registry.register_column(string("tags", ".")).unwrap();
    registry.rehome(id, "tags");
    assert_eq!(registry.column(id).nested_path, vec!["tags", "."]);
    assert_eq!(registry.column(id).table_path(), Some("tags"));
  }

  #[test]
  fn lookup_unknown_table_is_empty() {
    let registry = Registry::new();
    assert!(registry.lookup("nope", "name").is_empty());
  }
}
