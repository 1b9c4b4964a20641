//! Test helpers for code that consumes this crate
//!
//! Enabled with the `testkit` feature. Nothing here touches a real
//! database: [`FailureDb`] and [`FailureStatement`] inject failures into
//! every code path, and [`CollectLogger`] records the SQL a connection
//! actually sent.

use std::sync::Mutex;

use crate::db::Db;
use crate::error::{Error, Result};
use crate::log::QueryLogger;
use crate::row::{ExecResult, Row, Rows};
use crate::statements::Statement;
use crate::transaction::Transaction;
use crate::value::Value;

/// A [`Db`] whose every operation fails.
///
/// `transact` does invoke its callback, handing it a transaction handle
/// that was never started — so every operation inside the callback fails
/// with [`Error::TransactionNotRunning`].
#[derive(Debug, Default)]
pub struct FailureDb;

impl Db for FailureDb {
   async fn exec(&self, _sql: &str, _args: Vec<Value>) -> Result<ExecResult> {
      Err(Error::Other("FailureDb::exec".into()))
   }

   async fn query(&self, _sql: &str, _args: Vec<Value>) -> Result<Rows> {
      Err(Error::Other("FailureDb::query".into()))
   }

   async fn query_row(&self, _sql: &str, _args: Vec<Value>) -> Row {
      Row::from_error(Error::Other("FailureDb::query_row".into()))
   }

   async fn transact<F, Fut>(&self, f: F) -> Result<()>
   where
      F: FnOnce(Transaction) -> Fut + Send,
      Fut: Future<Output = Result<()>> + Send,
   {
      f(Transaction::detached()).await
   }
}

/// A [`Statement`] whose build always fails.
#[derive(Debug, Default)]
pub struct FailureStatement;

impl Statement for FailureStatement {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      Err(Error::Other("FailureStatement::build".into()))
   }
}

/// A query recorded by [`CollectLogger`]
#[derive(Debug, Clone)]
pub struct CollectedQuery {
   pub sql: String,
   pub args: Vec<Value>,
}

/// Query logger that records every statement a connection sends, savepoint
/// commands included. Share it with the connection through an `Arc`:
///
/// ```no_run
/// # async fn example() -> sqlx_sqlite_dbkit::Result<()> {
/// use std::sync::Arc;
/// use sqlx_sqlite_dbkit::{Conn, testkit::CollectLogger};
///
/// let logger = Arc::new(CollectLogger::default());
/// let conn = Conn::open(":memory:").await?;
/// conn.set_logger(logger.clone());
/// // … run queries, then assert on logger.queries()
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CollectLogger {
   queries: Mutex<Vec<CollectedQuery>>,
}

impl CollectLogger {
   /// Everything logged so far, in order.
   pub fn queries(&self) -> Vec<CollectedQuery> {
      self.queries.lock().expect("collect logger lock poisoned").clone()
   }
}

impl QueryLogger for CollectLogger {
   fn log_query(&self, sql: &str, args: &[Value]) {
      self
         .queries
         .lock()
         .expect("collect logger lock poisoned")
         .push(CollectedQuery {
            sql: sql.to_owned(),
            args: args.to_vec(),
         });
   }
}
