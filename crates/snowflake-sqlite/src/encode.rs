//! Conversion from SQLite cell values to the JSON values carried by
//! [`QueryResult`](snowflake_core::QueryResult).
//!
//! Integers and text map directly. Reals that JSON cannot represent (NaN,
//! infinities) become `null`. Blobs become arrays of byte values.

use rusqlite::types::ValueRef;
use serde_json::{Number, Value};

pub fn decode_value(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
    ValueRef::Text(bytes) => {
      Value::String(String::from_utf8_lossy(bytes).into_owned())
    }
    ValueRef::Blob(bytes) => {
      Value::Array(bytes.iter().map(|&b| Value::from(b)).collect())
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn scalars() {
    assert_eq!(decode_value(ValueRef::Null), Value::Null);
    assert_eq!(decode_value(ValueRef::Integer(7)), json!(7));
    assert_eq!(decode_value(ValueRef::Real(1.5)), json!(1.5));
    assert_eq!(decode_value(ValueRef::Real(f64::NAN)), Value::Null);
    assert_eq!(decode_value(ValueRef::Text(b"red")), json!("red"));
    assert_eq!(decode_value(ValueRef::Blob(&[1, 2])), json!([1, 2]));
  }
}
