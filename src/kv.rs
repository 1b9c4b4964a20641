//! Simple key-value store backed by a toolkit database
//!
//! Values are blobs; keys are text. [`prepare`] creates the backing table,
//! after which [`set`] / [`get`] / [`delete`] / [`exists`] work against any
//! [`Db`] — a [`Conn`](crate::Conn), a [`DbPool`](crate::DbPool), or a
//! [`Transaction`](crate::Transaction).

use time::OffsetDateTime;

use crate::db::Db;
use crate::error::{Error, Result};
use crate::statements::{ColumnType, column, cond, create_table, delete_from, insert_into, select};
use crate::value::Value;

/// Table backing the key-value store
pub const KV_TABLE: &str = "dbkit_kv";

const KEY: &str = "Key";
const VALUE: &str = "Value";

/// Create the key-value table when it does not exist yet.
pub async fn prepare<D: Db>(db: &D) -> Result<()> {
   let stmt = create_table(KV_TABLE)
      .if_not_exists()
      .primary_key(KEY, ColumnType::Text)
      .column(column(VALUE, ColumnType::Blob).not_null())
      .column(
         column("CreatedAt", ColumnType::Integer)
            .not_null()
            .default_literal("CURRENT_TIMESTAMP"),
      )
      .column(column("UpdatedAt", ColumnType::Integer).not_null());

   db.transact(move |tx| async move {
      tx.exec_statement(&stmt).await?;
      Ok(())
   })
   .await
}

/// Store `value` under `key`, overwriting any previous value.
pub async fn set<D: Db>(db: &D, key: &str, value: impl Into<Vec<u8>>) -> Result<()> {
   let stmt = insert_into(KV_TABLE)
      .or_replace()
      .value(KEY, key)
      .value(VALUE, value.into())
      .value("UpdatedAt", OffsetDateTime::now_utc().unix_timestamp());

   db.exec_statement(&stmt).await?;
   Ok(())
}

/// Fetch the value stored under `key`; [`Error::NoRows`] when absent.
pub async fn get<D: Db>(db: &D, key: &str) -> Result<Vec<u8>> {
   let stmt = select([VALUE]).from(KV_TABLE).filter(cond::eq(KEY, key)).limit(1);

   match db.query_row_statement(&stmt).await.value()? {
      Value::Blob(bytes) => Ok(bytes),
      Value::Text(text) => Ok(text.into_bytes()),
      other => Err(Error::UnsupportedDatatype(other.storage_class().into())),
   }
}

/// Remove `key`. Removing an absent key is not an error.
pub async fn delete<D: Db>(db: &D, key: &str) -> Result<()> {
   let stmt = delete_from(KV_TABLE).filter(cond::eq(KEY, key));
   db.exec_statement(&stmt).await?;
   Ok(())
}

/// `true` when `key` is present.
pub async fn exists<D: Db>(db: &D, key: &str) -> Result<bool> {
   let stmt = crate::statements::exists(
      select(["1"]).from(KV_TABLE).filter(cond::eq(KEY, key)).limit(1),
   );

   let value = db.query_row_statement(&stmt).await.value()?;
   Ok(value.as_bool().unwrap_or(false))
}
