//! Columns and scalar types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{naming, path};

// ─── Scalar type ─────────────────────────────────────────────────────────────

/// The type of value a column holds.
///
/// `Nested` marks a field whose value is an array of sub-documents; such a
/// field is backed by a child table rather than a physical column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScalarType {
  String,
  Number,
  Integer,
  Boolean,
  Nested,
}

impl ScalarType {
  /// The declared storage type for a physical column, or `None` for
  /// `Nested`.
  pub fn storage_type(self) -> Option<&'static str> {
    match self {
      ScalarType::String => Some("TEXT"),
      ScalarType::Number => Some("REAL"),
      ScalarType::Integer | ScalarType::Boolean => Some("INTEGER"),
      ScalarType::Nested => None,
    }
  }

  /// Map a declared storage type back to a scalar type. Used for physical
  /// columns whose name carries no type suffix.
  pub fn from_storage_type(declared: &str) -> Option<Self> {
    match declared.trim().to_ascii_uppercase().as_str() {
      "TEXT" => Some(ScalarType::String),
      "REAL" => Some(ScalarType::Number),
      "INTEGER" => Some(ScalarType::Integer),
      _ => None,
    }
  }
}

// ─── Column ──────────────────────────────────────────────────────────────────

/// Stable handle of a column inside a [`Registry`](crate::Registry).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct ColumnId(pub(crate) usize);

impl ColumnId {
  pub fn index(self) -> usize { self.0 }
}

fn root_nested_path() -> Vec<String> { vec![path::ROOT.to_owned()] }

/// One physical storage slot for an `(absolute_name, scalar_type)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnDef")]
pub struct Column {
  /// Dotted path from the document root.
  pub absolute_name: String,
  #[serde(rename = "type")]
  pub scalar_type:   ScalarType,
  /// Every table this column has been part of, innermost (current) first.
  pub nested_path:   Vec<String>,
  /// The literal storage column identifier.
  pub physical_name: String,
  /// Name relative to each registered table, keyed by table path. Filled in
  /// by the registry.
  pub names:         BTreeMap<String, String>,
}

/// Wire shape of a [`Column`]. The physical name defaults to the typed
/// encoding of the field; relative names are always recomputed.
#[derive(Deserialize)]
struct ColumnDef {
  absolute_name: String,
  #[serde(rename = "type")]
  scalar_type:   ScalarType,
  #[serde(default = "root_nested_path")]
  nested_path:   Vec<String>,
  #[serde(default)]
  physical_name: Option<String>,
}

impl From<ColumnDef> for Column {
  fn from(def: ColumnDef) -> Self {
    let physical_name = def.physical_name.unwrap_or_else(|| {
      naming::typed_column(&def.absolute_name, def.scalar_type)
    });
    Self {
      absolute_name: def.absolute_name,
      scalar_type: def.scalar_type,
      nested_path: def.nested_path.into_iter().map(path::normalize).collect(),
      physical_name,
      names: BTreeMap::new(),
    }
  }
}

impl Column {
  pub fn new(
    absolute_name: impl Into<String>,
    scalar_type: ScalarType,
    table_path: impl Into<String>,
  ) -> Self {
    let absolute_name = absolute_name.into();
    Self {
      physical_name: naming::typed_column(&absolute_name, scalar_type),
      absolute_name,
      scalar_type,
      nested_path: vec![path::normalize(table_path.into())],
      names: BTreeMap::new(),
    }
  }

  /// Use `physical_name` as the storage identifier instead of the typed
  /// encoding.
  pub fn with_physical_name(
    mut self,
    physical_name: impl Into<String>,
  ) -> Self {
    self.physical_name = physical_name.into();
    self
  }

  /// The table this column is currently stored in.
  pub fn table_path(&self) -> Option<&str> {
    self.nested_path.first().map(String::as_str)
  }

  /// This column's name relative to the table at `table_path`.
  pub fn name_in(&self, table_path: &str) -> Option<&str> {
    self.names.get(table_path).map(String::as_str)
  }

  pub fn is_nested(&self) -> bool { self.scalar_type == ScalarType::Nested }
}
