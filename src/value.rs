//! Owned SQL values for binding and decoding

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value as JsonValue;

/// An owned SQLite value, one variant per storage class.
///
/// `Value` is the currency for bind arguments and decoded columns. It exists
/// (instead of passing JSON around) so blobs and large integers survive
/// round trips without re-encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
   Null,
   Integer(i64),
   Real(f64),
   Text(String),
   Blob(Vec<u8>),
}

impl Value {
   pub fn is_null(&self) -> bool {
      matches!(self, Value::Null)
   }

   pub fn as_i64(&self) -> Option<i64> {
      match self {
         Value::Integer(v) => Some(*v),
         _ => None,
      }
   }

   /// Numeric value as a float; integers widen.
   pub fn as_f64(&self) -> Option<f64> {
      match self {
         Value::Real(v) => Some(*v),
         Value::Integer(v) => Some(*v as f64),
         _ => None,
      }
   }

   /// Integer truthiness (SQLite has no native boolean storage class).
   pub fn as_bool(&self) -> Option<bool> {
      match self {
         Value::Integer(v) => Some(*v != 0),
         _ => None,
      }
   }

   pub fn as_str(&self) -> Option<&str> {
      match self {
         Value::Text(v) => Some(v),
         _ => None,
      }
   }

   pub fn as_blob(&self) -> Option<&[u8]> {
      match self {
         Value::Blob(v) => Some(v),
         _ => None,
      }
   }

   /// The SQLite storage class this value belongs to.
   pub fn storage_class(&self) -> &'static str {
      match self {
         Value::Null => "NULL",
         Value::Integer(_) => "INTEGER",
         Value::Real(_) => "REAL",
         Value::Text(_) => "TEXT",
         Value::Blob(_) => "BLOB",
      }
   }

   /// Convert to JSON. Blobs become base64 strings; a non-finite float
   /// becomes JSON null (JSON has no representation for it).
   pub fn to_json(&self) -> JsonValue {
      match self {
         Value::Null => JsonValue::Null,
         Value::Integer(v) => JsonValue::from(*v),
         Value::Real(v) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
         Value::Text(v) => JsonValue::String(v.clone()),
         Value::Blob(v) => JsonValue::String(BASE64.encode(v)),
      }
   }

   /// Convert from JSON. Booleans become integers 0/1; arrays and objects
   /// are stored as serialized JSON text.
   pub fn from_json(value: JsonValue) -> Value {
      match value {
         JsonValue::Null => Value::Null,
         JsonValue::Bool(v) => Value::Integer(v.into()),
         JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
               Value::Integer(v)
            } else {
               Value::Real(n.as_f64().unwrap_or_default())
            }
         }
         JsonValue::String(v) => Value::Text(v),
         other => Value::Text(other.to_string()),
      }
   }
}

impl From<i64> for Value {
   fn from(v: i64) -> Self {
      Value::Integer(v)
   }
}

impl From<i32> for Value {
   fn from(v: i32) -> Self {
      Value::Integer(v.into())
   }
}

impl From<u32> for Value {
   fn from(v: u32) -> Self {
      Value::Integer(v.into())
   }
}

impl From<bool> for Value {
   fn from(v: bool) -> Self {
      Value::Integer(v.into())
   }
}

impl From<f64> for Value {
   fn from(v: f64) -> Self {
      Value::Real(v)
   }
}

impl From<f32> for Value {
   fn from(v: f32) -> Self {
      Value::Real(v.into())
   }
}

impl From<&str> for Value {
   fn from(v: &str) -> Self {
      Value::Text(v.to_owned())
   }
}

impl From<String> for Value {
   fn from(v: String) -> Self {
      Value::Text(v)
   }
}

impl From<Vec<u8>> for Value {
   fn from(v: Vec<u8>) -> Self {
      Value::Blob(v)
   }
}

impl From<&[u8]> for Value {
   fn from(v: &[u8]) -> Self {
      Value::Blob(v.to_owned())
   }
}

impl<T> From<Option<T>> for Value
where
   T: Into<Value>,
{
   fn from(v: Option<T>) -> Self {
      match v {
         Some(v) => v.into(),
         None => Value::Null,
      }
   }
}

/// Build a `Vec<Value>` of bind arguments from heterogeneous expressions.
///
/// ```
/// use sqlx_sqlite_dbkit::{Value, values};
///
/// let args = values!["alice", 42, None::<i64>];
/// assert_eq!(args[2], Value::Null);
/// ```
#[macro_export]
macro_rules! values {
   () => {
      ::std::vec::Vec::<$crate::Value>::new()
   };
   ($($value:expr),+ $(,)?) => {
      <[_]>::into_vec(::std::boxed::Box::new([$($crate::Value::from($value)),+]))
   };
}

/// Helper function to bind a [`Value`] to a SQLx query
pub(crate) fn bind_value<'q>(
   query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
   value: Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
   match value {
      Value::Null => query.bind(None::<i64>),
      Value::Integer(v) => query.bind(v),
      Value::Real(v) => query.bind(v),
      Value::Text(v) => query.bind(v),
      Value::Blob(v) => query.bind(v),
   }
}
