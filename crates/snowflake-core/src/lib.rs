//! Core model for mapping hierarchical documents onto an evolving set of
//! relational tables.
//!
//! A [`Snowflake`] owns every [`Column`] ever observed for one fact (document
//! collection) and every [`Table`] those columns live in. It rebuilds that
//! model from an existing store, bootstraps a fresh fact table, and applies
//! [`ChangeRequest`]s by issuing DDL/DML through the [`Storage`] trait.
//!
//! This crate is free of database drivers; backends implement [`Storage`].

pub mod change;
pub mod column;
pub mod error;
pub mod naming;
pub mod path;
pub mod registry;
pub mod schema;
pub mod snowflake;
pub mod storage;

pub use change::ChangeRequest;
pub use column::{Column, ColumnId, ScalarType};
pub use error::{Error, Result};
pub use registry::Registry;
pub use schema::{Schema, Table};
pub use snowflake::{SchemaSnapshot, Snowflake, TableSnapshot};
pub use storage::{QueryResult, Storage};
