//! The common contract for anything that can run queries

use crate::error::Result;
use crate::row::{ExecResult, Row, Rows};
use crate::statements::Statement;
use crate::transaction::Transaction;
use crate::value::Value;

/// CRUD operations plus transactions, implemented by
/// [`Conn`](crate::Conn), [`Transaction`](crate::Transaction), and
/// [`DbPool`](crate::DbPool) so callers are agnostic to pooled-vs-direct
/// and transactional-vs-not.
#[allow(async_fn_in_trait)]
pub trait Db: Send + Sync {
   /// Run a query that returns no rows (e.g. INSERT or DELETE).
   async fn exec(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult>;

   /// Run a query and return every matching row.
   async fn query(&self, sql: &str, args: Vec<Value>) -> Result<Rows>;

   /// Run a query for a single row. The returned [`Row`] always exists;
   /// failures are carried inside it.
   async fn query_row(&self, sql: &str, args: Vec<Value>) -> Row;

   /// Run `f` inside a transaction scoped to a fresh savepoint.
   ///
   /// The callback's result settles the savepoint: `Ok` commits, an error
   /// rolls back (see [`Error::RollbackRequested`](crate::Error) for the
   /// soft-rollback sentinel), and a panic rolls back before resuming the
   /// unwind.
   async fn transact<F, Fut>(&self, f: F) -> Result<()>
   where
      F: FnOnce(Transaction) -> Fut + Send,
      Fut: Future<Output = Result<()>> + Send;

   /// Build `statement` and [`exec`](Db::exec) it.
   async fn exec_statement<S: Statement + Sync + ?Sized>(&self, statement: &S) -> Result<ExecResult> {
      let (sql, args) = statement.build()?;
      self.exec(&sql, args).await
   }

   /// Build `statement` and [`query`](Db::query) it.
   async fn query_statement<S: Statement + Sync + ?Sized>(&self, statement: &S) -> Result<Rows> {
      let (sql, args) = statement.build()?;
      self.query(&sql, args).await
   }

   /// Build `statement` and [`query_row`](Db::query_row) it. A failed build
   /// still yields a [`Row`], carrying the build error.
   async fn query_row_statement<S: Statement + Sync + ?Sized>(&self, statement: &S) -> Row {
      match statement.build() {
         Ok((sql, args)) => self.query_row(&sql, args).await,
         Err(error) => Row::from_error(error),
      }
   }
}
