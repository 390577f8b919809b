//! [`Snowflake`] — the schema manager for one fact.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  change::ChangeRequest,
  column::{Column, ColumnId, ScalarType},
  naming::{self, GUID, ORDER, PARENT, UID, quote},
  path::{self, ROOT, starts_with_field},
  registry::Registry,
  schema::Table,
  storage::{QueryResult, Storage},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A serialisable view of the whole model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
  pub fact:    String,
  pub tables:  Vec<TableSnapshot>,
  pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
  pub path:          String,
  pub physical_name: String,
  pub fields:        Vec<String>,
}

// ─── Snowflake ───────────────────────────────────────────────────────────────

/// Owns the column registry and tables of one fact, and keeps the physical
/// schema in `storage` in step with them.
pub struct Snowflake<S> {
  fact:     String,
  storage:  S,
  registry: Registry,
}

impl<S: Storage> Snowflake<S> {
  /// An empty model for `fact`. Nothing is read from or written to storage.
  pub fn new(fact: impl Into<String>, storage: S) -> Self {
    Self { fact: fact.into(), storage, registry: Registry::new() }
  }

  /// Bind to `fact` in `storage`: rebuild the model from existing tables, or
  /// create the fact table keyed on `id_fields` if there are none.
  ///
  /// An empty `id_fields` means the surrogate id alone identifies a row.
  pub fn open(
    fact: impl Into<String>,
    id_fields: &[impl AsRef<str>],
    storage: S,
  ) -> Result<Self> {
    let mut snowflake = Self::new(fact, storage);
    if !snowflake.read_existing_schema()? {
      snowflake.create_fact(id_fields)?;
    }
    Ok(snowflake)
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn fact_name(&self) -> &str { &self.fact }

  pub fn storage(&self) -> &S { &self.storage }

  pub fn registry(&self) -> &Registry { &self.registry }

  pub fn table(&self, path: &str) -> Option<&Table> { self.registry.table(path) }

  pub fn tables(&self) -> &[Table] { self.registry.tables() }

  pub fn column(&self, id: ColumnId) -> &Column { self.registry.column(id) }

  pub fn columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> {
    self.registry.columns()
  }

  /// Columns reachable at `relative_name` from the table at `table_path`.
  pub fn lookup(&self, table_path: &str, relative_name: &str) -> Vec<&Column> {
    self.registry.lookup(table_path, relative_name)
  }

  pub fn physical_table_name(&self, table_path: &str) -> String {
    naming::physical_table_name(&self.fact, table_path)
  }

  pub fn snapshot(&self) -> SchemaSnapshot {
    SchemaSnapshot {
      fact:    self.fact.clone(),
      tables:  self
        .tables()
        .iter()
        .map(|t| TableSnapshot {
          path:          t.path().to_owned(),
          physical_name: self.physical_table_name(t.path()),
          fields:        t.schema().keys().map(str::to_owned).collect(),
        })
        .collect(),
      columns: self.columns().map(|(_, c)| c.clone()).collect(),
    }
  }

  // ── Statements ────────────────────────────────────────────────────────────

  fn query(&self, sql: &str) -> Result<QueryResult> {
    debug!(sql, "query");
    self.storage.query(sql).map_err(Error::storage)
  }

  fn execute(&self, sql: &str) -> Result<()> {
    debug!(sql, "execute");
    self.storage.execute(sql).map_err(Error::storage)
  }

  fn table_info(&self, table_name: &str) -> Result<QueryResult> {
    self.query(&format!("PRAGMA table_info({})", quote(table_name)))
  }

  // ── Rehydration ───────────────────────────────────────────────────────────

  /// Rebuild the model from the tables already in storage.
  ///
  /// Returns `false` if the fact has no tables yet.
  pub fn read_existing_schema(&mut self) -> Result<bool> {
    let listing = self.query(
      "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid",
    )?;

    let mut found: Vec<(String, String)> = Vec::new();
    for row in 0..listing.len() {
      let Some(name) = listing.get_str(row, "name") else { continue };
      if naming::is_reserved(name) {
        continue;
      }
      match naming::table_path_of(&self.fact, name) {
        Some(path) => found.push((path, name.to_owned())),
        None => debug!(table = name, "not part of this fact, skipping"),
      }
    }
    if found.is_empty() {
      return Ok(false);
    }
    found.sort_by_key(|(table_path, _)| path::split_field(table_path).len());

    // (field, type) -> stored name and tables holding it, parents first
    let mut homes: Vec<(String, ScalarType, String, Vec<String>)> = Vec::new();
    let mut seen: HashMap<(String, ScalarType), usize> = HashMap::new();

    for (table_path, table_name) in &found {
      self.registry.register_table(table_path)?;

      let mut in_table: HashSet<(String, ScalarType)> = HashSet::new();
      let details = self.table_info(table_name)?;
      for row in 0..details.len() {
        let Some(physical) = details.get_str(row, "name") else { continue };
        if naming::is_reserved(physical) {
          continue;
        }
        let declared = details.get_str(row, "type").unwrap_or_default();
        let (field, decoded) = naming::untyped_column(physical);
        let Some(scalar_type) =
          decoded.or_else(|| ScalarType::from_storage_type(declared))
        else {
          warn!(
            table = %table_name,
            column = physical,
            declared,
            "undecodable column, skipping"
          );
          continue;
        };

        let key = (field.to_owned(), scalar_type);
        if !in_table.insert(key.clone()) {
          warn!(
            table = %table_name,
            column = physical,
            field,
            %scalar_type,
            "second column for the same field and type, skipping"
          );
          continue;
        }

        match seen.get(&key) {
          Some(&slot) => homes[slot].3.push(table_path.clone()),
          None => {
            seen.insert(key, homes.len());
            homes.push((
              field.to_owned(),
              scalar_type,
              physical.to_owned(),
              vec![table_path.clone()],
            ));
          }
        }
      }
    }

    // every child table stands for a nested field in its nearest ancestor
    for (table_path, _) in &found {
      if path::is_root(table_path) {
        continue;
      }
      let parent = path::ancestors(table_path)
        .into_iter()
        .find(|p| self.registry.table(p).is_some())
        .unwrap_or_else(|| ROOT.to_owned());
      let physical = naming::typed_column(table_path, ScalarType::Nested);
      homes.push((
        table_path.clone(),
        ScalarType::Nested,
        physical,
        vec![parent],
      ));
    }

    for (field, scalar_type, physical, mut tables) in homes {
      tables.reverse();
      let mut column =
        Column::new(field, scalar_type, ROOT).with_physical_name(physical);
      column.nested_path = tables;
      self.registry.register_column(column)?;
    }

    info!(
      fact = %self.fact,
      tables = self.registry.tables().len(),
      columns = self.registry.column_count(),
      "rehydrated schema"
    );
    Ok(true)
  }

  // ── Fact creation ─────────────────────────────────────────────────────────

  /// Create the fact table, keyed on the surrogate id plus `id_fields`.
  pub fn create_fact(&mut self, id_fields: &[impl AsRef<str>]) -> Result<()> {
    self.registry.register_table(ROOT)?;

    for field in id_fields {
      let field = field.as_ref();
      if field == GUID {
        continue;
      }
      self
        .registry
        .register_column(Column::new(field, ScalarType::String, ROOT))?;
    }

    let root = self
      .registry
      .table(ROOT)
      .ok_or_else(|| Error::UnknownTable(ROOT.to_owned()))?;
    let id_columns: Vec<&Column> = root
      .schema()
      .column_ids()
      .map(|id| self.registry.column(id))
      .collect();

    let mut definitions = vec![format!("{} INTEGER", quote(UID))];
    let mut keys = vec![quote(UID)];
    for column in &id_columns {
      let Some(sql_type) = column.scalar_type.storage_type() else { continue };
      definitions.push(format!("{} {sql_type}", quote(&column.physical_name)));
      keys.push(quote(&column.physical_name));
    }

    let sql = format!(
      "CREATE TABLE {} ({}, PRIMARY KEY ({}))",
      quote(&self.fact),
      definitions.join(", "),
      keys.join(", "),
    );
    self.execute(&sql)?;

    info!(fact = %self.fact, id_columns = keys.len() - 1, "created fact table");
    Ok(())
  }

  // ── Schema changes ────────────────────────────────────────────────────────

  /// Apply `changes` in order. Stops at the first failure; earlier changes
  /// stay applied.
  pub fn apply_changes(
    &mut self,
    changes: impl IntoIterator<Item = ChangeRequest>,
  ) -> Result<()> {
    for change in changes {
      match change {
        ChangeRequest::AddColumn { column } => self.add_column(column)?,
        ChangeRequest::NestField { column, path } => {
          self.nest_field(column, &path)?
        }
      }
    }
    Ok(())
  }

  fn add_column(&mut self, column: Column) -> Result<()> {
    let table_path = self.current_table(&column)?.to_owned();
    if self
      .registry
      .find_column(&column.absolute_name, column.scalar_type)
      .is_some()
    {
      return Err(Error::DuplicateColumn {
        name:        column.absolute_name,
        scalar_type: column.scalar_type,
      });
    }

    if column.is_nested() {
      self.nest(&column, &column.absolute_name)?;
    } else if let Some(sql_type) = column.scalar_type.storage_type() {
      self.execute(&format!(
        "ALTER TABLE {} ADD COLUMN {} {sql_type}",
        quote(&self.physical_table_name(&table_path)),
        quote(&column.physical_name),
      ))?;
    }

    info!(
      field = %column.absolute_name,
      scalar_type = %column.scalar_type,
      table = %table_path,
      "added column"
    );
    self.registry.register_column(column)?;
    Ok(())
  }

  fn nest_field(&mut self, column: Column, new_path: &str) -> Result<()> {
    self.nest(&column, new_path)?;

    if self
      .registry
      .find_column(&column.absolute_name, ScalarType::Nested)
      .is_none()
    {
      let source = self.current_table(&column)?.to_owned();
      self.registry.register_column(Column::new(
        column.absolute_name,
        ScalarType::Nested,
        source,
      ))?;
    }
    Ok(())
  }

  /// Move the field of `column`, and everything under it, out of its current
  /// table into a new child table at `new_path`, copying every row that has
  /// data for it.
  ///
  /// Migrated rows get order `0`: flat columns hold at most one element per
  /// parent row. The source columns are left in place.
  fn nest(&mut self, column: &Column, new_path: &str) -> Result<()> {
    let source_path = self.current_table(column)?.to_owned();
    if column.absolute_name != new_path || path::is_root(new_path) {
      return Err(Error::NestPathMismatch {
        field: column.absolute_name.clone(),
        path:  new_path.to_owned(),
      });
    }

    let source = self.physical_table_name(&source_path);
    let destination = self.physical_table_name(new_path);
    if self.registry.table(new_path).is_some()
      || !self.table_info(&destination)?.is_empty()
    {
      return Err(Error::UnexpectedTable(destination));
    }

    let moving: Vec<ColumnId> = self
      .registry
      .columns()
      .filter(|(_, c)| {
        !c.is_nested()
          && c.table_path() == Some(source_path.as_str())
          && starts_with_field(&c.absolute_name, &column.absolute_name)
      })
      .map(|(id, _)| id)
      .collect();

    self.registry.register_table(new_path)?;

    self.execute(&format!(
      "CREATE TABLE {} ({} INTEGER PRIMARY KEY)",
      quote(&destination),
      quote(UID),
    ))?;
    self.execute(&format!(
      "ALTER TABLE {} ADD COLUMN {} INTEGER",
      quote(&destination),
      quote(PARENT),
    ))?;
    self.execute(&format!(
      "ALTER TABLE {} ADD COLUMN {} INTEGER",
      quote(&destination),
      quote(ORDER),
    ))?;

    let mut moved = Vec::with_capacity(moving.len());
    for id in moving {
      self.registry.rehome(id, new_path);
      let moved_column = self.registry.column(id);
      let physical = quote(&moved_column.physical_name);
      if let Some(sql_type) = moved_column.scalar_type.storage_type() {
        self.execute(&format!(
          "ALTER TABLE {} ADD COLUMN {physical} {sql_type}",
          quote(&destination),
        ))?;
      }
      moved.push(physical);
    }

    let has_nested_data = match moved.as_slice() {
      [] => "0".to_owned(),
      [only] => format!("{only} IS NOT NULL"),
      many => format!("COALESCE({}) IS NOT NULL", many.join(", ")),
    };

    let targets = [quote(PARENT), quote(ORDER)]
      .into_iter()
      .chain(moved.iter().cloned())
      .collect::<Vec<_>>();
    let values = [quote(UID), "0".to_owned()]
      .into_iter()
      .chain(moved.iter().cloned())
      .collect::<Vec<_>>();

    self.execute(&format!(
      "INSERT INTO {} ({}) SELECT {} FROM {} WHERE {has_nested_data}",
      quote(&destination),
      targets.join(", "),
      values.join(", "),
      quote(&source),
    ))?;

    info!(
      field = %column.absolute_name,
      from = %source,
      into = %destination,
      moved = moved.len(),
      "nested field"
    );
    Ok(())
  }

  /// The registered table `column` currently lives in.
  fn current_table<'c>(&self, column: &'c Column) -> Result<&'c str> {
    let path = column
      .table_path()
      .ok_or_else(|| Error::EmptyNestedPath(column.absolute_name.clone()))?;
    if self.registry.table(path).is_none() {
      return Err(Error::UnknownTable(path.to_owned()));
    }
    Ok(path)
  }
}
