//! The `Storage` trait: the tabular engine a [`Snowflake`](crate::Snowflake)
//! drives.
//!
//! Statements are plain SQL strings executed in the order they are issued.
//! Implemented by storage backends (e.g. `snowflake-sqlite`).

use serde_json::Value;

// ─── Query result ────────────────────────────────────────────────────────────

/// Rows returned by [`Storage::query`], with their column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
  pub header: Vec<String>,
  pub data:   Vec<Vec<Value>>,
}

impl QueryResult {
  pub fn len(&self) -> usize { self.data.len() }

  pub fn is_empty(&self) -> bool { self.data.is_empty() }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.header.iter().position(|h| h == name)
  }

  /// The cell at `row` under column `name`.
  pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
    let col = self.column_index(name)?;
    self.data.get(row)?.get(col)
  }

  pub fn get_str(&self, row: usize, name: &str) -> Option<&str> {
    self.get(row, name)?.as_str()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A tabular storage engine.
///
/// Calls block until the statement has taken effect; each statement may
/// depend on the physical effect of the one before it.
pub trait Storage {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run a statement that returns rows (introspection or reads).
  fn query(&self, sql: &str) -> Result<QueryResult, Self::Error>;

  /// Run DDL or DML.
  fn execute(&self, sql: &str) -> Result<(), Self::Error>;
}

impl<S: Storage + ?Sized> Storage for &S {
  type Error = S::Error;

  fn query(&self, sql: &str) -> Result<QueryResult, Self::Error> {
    (**self).query(sql)
  }

  fn execute(&self, sql: &str) -> Result<(), Self::Error> {
    (**self).execute(sql)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn cells_by_name() {
    let result = QueryResult {
      header: vec!["cid".into(), "name".into(), "type".into()],
      data:   vec![vec![json!(0), json!("name.$string"), json!("TEXT")]],
    };
    assert_eq!(result.get_str(0, "name"), Some("name.$string"));
    assert_eq!(result.get(0, "cid"), Some(&json!(0)));
    assert_eq!(result.get(0, "pk"), None);
    assert_eq!(result.get(1, "name"), None);
  }
}
