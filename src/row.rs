//! Thin wrappers around SQLx result types

use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::value::Value;

/// Result summary of an executed SQL command (e.g. INSERT, UPDATE, DELETE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
   /// The number of rows affected by the command.
   pub rows_affected: u64,

   /// The last inserted SQLite ROWID. Only meaningful after INSERT on a
   /// table with a ROWID; `WITHOUT ROWID` tables report 0.
   pub last_insert_rowid: i64,
}

/// Rows returned by a query.
pub struct Rows {
   rows: Vec<SqliteRow>,
}

impl Rows {
   pub(crate) fn new(rows: Vec<SqliteRow>) -> Self {
      Self { rows }
   }

   pub fn len(&self) -> usize {
      self.rows.len()
   }

   pub fn is_empty(&self) -> bool {
      self.rows.is_empty()
   }

   /// Decode every row into a [`Record`], preserving column order.
   pub fn records(self) -> Result<Vec<Record>> {
      self.rows.iter().map(decode_row).collect()
   }

   /// Decode every row into a `Deserialize` struct.
   pub fn deserialize<T: serde::de::DeserializeOwned>(self) -> Result<Vec<T>> {
      self.records()?.iter().map(|record| record.deserialize()).collect()
   }
}

impl std::fmt::Debug for Rows {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Rows").field("len", &self.rows.len()).finish()
   }
}

/// The result of a query for a single row.
///
/// A `Row` is always constructed, never an error: failures (engine errors,
/// failed statement builds, failed pool checkouts) are carried inside and
/// surface when the row is inspected. A query that matched nothing carries
/// no row and reports [`Error::NoRows`] when read.
pub struct Row {
   outcome: Result<Option<SqliteRow>>,
}

impl Row {
   pub(crate) fn from_result(outcome: Result<Option<SqliteRow>>) -> Self {
      Self { outcome }
   }

   /// A row that reports `error` from every accessor.
   pub fn from_error(error: Error) -> Self {
      Self { outcome: Err(error) }
   }

   /// The stored error, if this row carries one instead of a result.
   pub fn err(&self) -> Option<&Error> {
      self.outcome.as_ref().err()
   }

   /// Decode the row into a [`Record`]. Fails with the stored error, or
   /// [`Error::NoRows`] when the query matched nothing.
   pub fn record(self) -> Result<Record> {
      match self.outcome? {
         Some(row) => decode_row(&row),
         None => Err(Error::NoRows),
      }
   }

   /// The first column's value. Convenient for scalar queries
   /// (`COUNT(*)`, `SELECT EXISTS(…)`).
   pub fn value(self) -> Result<Value> {
      match self.outcome? {
         Some(row) => decode_column(&row, 0),
         None => Err(Error::NoRows),
      }
   }

   /// Decode the row into a `Deserialize` struct.
   pub fn deserialize<T: serde::de::DeserializeOwned>(self) -> Result<T> {
      self.record()?.deserialize()
   }
}

impl std::fmt::Debug for Row {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      match &self.outcome {
         Ok(row) => f.debug_struct("Row").field("present", &row.is_some()).finish(),
         Err(error) => f.debug_struct("Row").field("err", error).finish(),
      }
   }
}

/// Decode a SQLite row into a [`Record`], preserving column order.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Record> {
   let mut record = Record::new();
   for (index, column) in row.columns().iter().enumerate() {
      record.insert(column.name().to_string(), decode_column(row, index)?);
   }
   Ok(record)
}

fn decode_column(row: &SqliteRow, index: usize) -> Result<Value> {
   let raw = row.try_get_raw(index)?;
   if raw.is_null() {
      return Ok(Value::Null);
   }

   // The value's runtime storage class; declared types (BOOLEAN, DATETIME,
   // …) can leak through from statement metadata, so both are handled.
   let type_name = raw.type_info().name().to_string();

   match type_name.as_str() {
      "INTEGER" => Ok(Value::Integer(decoded(raw, index)?)),
      "BOOLEAN" => Ok(Value::Integer(decoded::<bool>(raw, index)?.into())),
      "REAL" | "NUMERIC" => Ok(Value::Real(decoded(raw, index)?)),
      "TEXT" | "DATETIME" | "DATE" | "TIME" => Ok(Value::Text(decoded(raw, index)?)),
      "BLOB" => Ok(Value::Blob(decoded(raw, index)?)),
      other => Err(Error::UnsupportedDatatype(other.to_string())),
   }
}

fn decoded<'r, T: sqlx::Decode<'r, sqlx::Sqlite>>(
   raw: SqliteValueRef<'r>,
   index: usize,
) -> Result<T> {
   T::decode(raw).map_err(|source| {
      Error::Sqlx(sqlx::Error::ColumnDecode {
         index: index.to_string(),
         source,
      })
   })
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_row_reports_error_everywhere() {
      let row = Row::from_error(Error::ConnectionClosed);
      assert!(matches!(row.err(), Some(Error::ConnectionClosed)));
      assert!(matches!(row.record(), Err(Error::ConnectionClosed)));

      let row = Row::from_error(Error::ConnectionClosed);
      assert!(matches!(row.value(), Err(Error::ConnectionClosed)));
   }

   #[test]
   fn test_empty_row_is_no_rows() {
      let row = Row::from_result(Ok(None));
      assert!(row.err().is_none());
      assert!(matches!(row.record(), Err(Error::NoRows)));
   }
}
