//! Schema-change requests, as produced by document change detection.

use serde::{Deserialize, Serialize};

use crate::column::Column;

/// One requested schema change. Batches are applied in order.
///
/// Serialised as an object tagged by `"kind"`:
///
/// ```json
/// {"kind": "add_column", "column": {"absolute_name": "age", "type": "integer"}}
/// {"kind": "nest_field", "column": {"absolute_name": "tags", "type": "string"}, "path": "tags"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeRequest {
  /// Add a typed column. A `nested` column announces a new child table.
  AddColumn { column: Column },
  /// Promote the field of `column` into a child table at `path`.
  NestField { column: Column, path: String },
}
