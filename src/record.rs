//! Column-order-preserving row records

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::value::Value;

/// A decoded row: column name → [`Value`], in query column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
   columns: IndexMap<String, Value>,
}

impl Record {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
      self.columns.insert(column.into(), value.into());
   }

   /// Remove and return a column's value, preserving the order of the rest.
   pub fn remove(&mut self, column: &str) -> Option<Value> {
      self.columns.shift_remove(column)
   }

   pub fn get(&self, column: &str) -> Option<&Value> {
      self.columns.get(column)
   }

   pub fn contains(&self, column: &str) -> bool {
      self.columns.contains_key(column)
   }

   pub fn len(&self) -> usize {
      self.columns.len()
   }

   pub fn is_empty(&self) -> bool {
      self.columns.is_empty()
   }

   /// Column names in query order
   pub fn columns(&self) -> impl Iterator<Item = &str> {
      self.columns.keys().map(String::as_str)
   }

   pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
      self.columns.iter().map(|(k, v)| (k.as_str(), v))
   }

   /// The first column's value, if any. Convenient for single-column rows
   /// (`COUNT(*)`, `SELECT EXISTS(…)`).
   pub fn first_value(&self) -> Option<&Value> {
      self.columns.values().next()
   }

   // Lossy typed accessors: absent columns and mismatched types are None.

   pub fn get_i64(&self, column: &str) -> Option<i64> {
      self.get(column).and_then(Value::as_i64)
   }

   pub fn get_f64(&self, column: &str) -> Option<f64> {
      self.get(column).and_then(Value::as_f64)
   }

   pub fn get_bool(&self, column: &str) -> Option<bool> {
      self.get(column).and_then(Value::as_bool)
   }

   pub fn get_str(&self, column: &str) -> Option<&str> {
      self.get(column).and_then(Value::as_str)
   }

   pub fn get_blob(&self, column: &str) -> Option<&[u8]> {
      self.get(column).and_then(Value::as_blob)
   }

   /// Convert to a JSON object (blobs become base64 strings), preserving
   /// column order.
   pub fn to_json(&self) -> JsonValue {
      let mut map = serde_json::Map::with_capacity(self.columns.len());
      for (column, value) in &self.columns {
         map.insert(column.clone(), value.to_json());
      }
      JsonValue::Object(map)
   }

   /// Decode the record into a `Deserialize` struct. Column names map to
   /// field names; use serde attributes (`rename`, `default`, `skip`) where
   /// the two differ.
   pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
      Ok(serde_json::from_value(self.to_json())?)
   }
}

impl FromIterator<(String, Value)> for Record {
   fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
      Self {
         columns: iter.into_iter().collect(),
      }
   }
}

impl IntoIterator for Record {
   type Item = (String, Value);
   type IntoIter = indexmap::map::IntoIter<String, Value>;

   fn into_iter(self) -> Self::IntoIter {
      self.columns.into_iter()
   }
}
