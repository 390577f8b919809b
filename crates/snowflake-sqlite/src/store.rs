//! [`SqliteStorage`] — the SQLite implementation of [`Storage`].

use std::path::Path;

use rusqlite::Connection;
use snowflake_core::{QueryResult, Storage};
use tracing::trace;

use crate::{Error, Result, encode::decode_value};

/// A snowflake store backed by a single SQLite database.
pub struct SqliteStorage {
  conn: Connection,
}

impl SqliteStorage {
  /// Open (or create) the database file at `path`.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self { conn: Connection::open(path)? })
  }

  /// Open an in-memory database; useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    Ok(Self { conn: Connection::open_in_memory()? })
  }
}

impl Storage for SqliteStorage {
  type Error = Error;

  fn query(&self, sql: &str) -> Result<QueryResult> {
    let mut stmt = self.conn.prepare(sql)?;
    let header: Vec<String> =
      stmt.column_names().into_iter().map(str::to_owned).collect();
    let width = header.len();

    let data = stmt
      .query_map([], |row| {
        (0..width)
          .map(|i| row.get_ref(i).map(decode_value))
          .collect::<rusqlite::Result<Vec<_>>>()
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    trace!(sql, rows = data.len(), "query");
    Ok(QueryResult { header, data })
  }

  fn execute(&self, sql: &str) -> Result<()> {
    self.conn.execute_batch(sql)?;
    Ok(())
  }
}
