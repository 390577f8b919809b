//! SQLite backend for the snowflake schema manager.
//!
//! [`SqliteStorage`] implements [`snowflake_core::Storage`] over a
//! [`rusqlite::Connection`]. Statements run synchronously on the calling
//! thread, in the order they are issued.

mod encode;
mod store;

pub mod error;

use std::path::Path;

use snowflake_core::Snowflake;

pub use error::{Error, Result};
pub use store::SqliteStorage;

/// Open the SQLite file at `path` and bind a [`Snowflake`] for `fact` to it.
pub fn open(
  path: impl AsRef<Path>,
  fact: &str,
  id_fields: &[impl AsRef<str>],
) -> Result<Snowflake<SqliteStorage>> {
  let storage = SqliteStorage::open(path)?;
  Ok(Snowflake::open(fact, id_fields, storage)?)
}
