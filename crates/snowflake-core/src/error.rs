//! Error types for `snowflake-core`.

use thiserror::Error;

use crate::column::ScalarType;

#[derive(Debug, Error)]
pub enum Error {
  /// A column was filed under a relative name it does not compute for the
  /// table. The in-memory model is corrupt.
  #[error("column {found:?} filed as {expected:?} in table {table:?}")]
  NameMismatch {
    table:    String,
    expected: String,
    found:    String,
  },

  /// A physical table exists where a fresh nested table was to be created.
  #[error("unexpected existing table {0:?}; refusing to nest into it")]
  UnexpectedTable(String),

  #[error("table {0:?} is already registered")]
  DuplicateTable(String),

  #[error("column {name:?} of type {scalar_type} is already registered")]
  DuplicateColumn {
    name:        String,
    scalar_type: ScalarType,
  },

  #[error("unknown table {0:?}")]
  UnknownTable(String),

  #[error("column {0:?} has an empty nested path")]
  EmptyNestedPath(String),

  #[error("cannot nest field {field:?} into path {path:?}")]
  NestPathMismatch { field: String, path: String },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Storage(Box::new(err))
  }

  /// True for errors that mean the in-memory model and the physical store
  /// have diverged.
  pub fn is_invariant_violation(&self) -> bool {
    matches!(self, Error::NameMismatch { .. } | Error::UnexpectedTable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
