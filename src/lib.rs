//! # sqlx-sqlite-dbkit
//!
//! Pooled SQLite access built on SQLx: a bounded connection pool behind a
//! single-writer/multi-reader facade, savepoint-nested transactions, and
//! statement builders, with key-value and migration helpers layered on top.
//!
//! ## Core Types
//!
//! - **[`Conn`]**: one physical connection to a SQLite database
//! - **[`Transaction`]**: a savepoint-scoped (possibly nested) transaction
//! - **[`DbPool`]**: bounded pool of connections with read/write
//!   coordination, behind the same contract as a bare connection
//! - **[`Db`]**: the shared exec/query/transact contract
//! - **[`Value`]**, **[`Record`]**, **[`Row`]**, **[`Rows`]**: bind
//!   arguments and decoded results
//! - **[`Error`]**: error type for all toolkit operations
//!
//! ## Architecture
//!
//! - **Own pooling**: each [`Conn`] wraps a single SQLx connection; the
//!   bounded pool (the `bounded-pool` crate) does the pooling, bounding
//!   concurrent checkouts with a semaphore and recycling LIFO
//! - **Savepoint transactions**: [`Db::transact`] maps nested logical
//!   transactions onto one connection using uniquely named savepoints, with
//!   rollback-on-error, rollback-before-panic-unwind, and a soft-rollback
//!   sentinel ([`Error::RollbackRequested`])
//! - **Single writer**: SQLite allows one writer at a time, so [`DbPool`]
//!   serializes `exec`/`transact` behind a pool-wide write lock while
//!   queries share read access
//!
//! ```no_run
//! use sqlx_sqlite_dbkit::{Db, DbPool, values};
//!
//! # async fn example() -> sqlx_sqlite_dbkit::Result<()> {
//! let pool = DbPool::open("app.db", 4);
//!
//! pool.exec("CREATE TABLE people (name TEXT)", values![]).await?;
//!
//! pool
//!    .transact(|tx| async move {
//!       tx.exec("INSERT INTO people (name) VALUES (?)", values!["alice"]).await?;
//!       tx.exec("INSERT INTO people (name) VALUES (?)", values!["ben"]).await?;
//!       Ok(())
//!    })
//!    .await?;
//!
//! let count = pool.query_row("SELECT COUNT(*) FROM people", values![]).await;
//! assert_eq!(count.value()?.as_i64(), Some(2));
//! # Ok(())
//! # }
//! ```

mod conn;
mod db;
mod error;
mod log;
mod pool;
mod record;
mod row;
mod transaction;
mod value;

pub mod kv;
pub mod migrate;
pub mod statements;

#[cfg(feature = "testkit")]
pub mod testkit;

pub use bounded_pool::{self, PoolConfig};
pub use conn::Conn;
pub use db::Db;
pub use error::{Error, Result};
pub use log::{NoopQueryLogger, QueryLogger, TracingQueryLogger};
pub use pool::{DbPool, Reader};
pub use record::Record;
pub use row::{ExecResult, Row, Rows};
pub use transaction::Transaction;
pub use value::Value;
