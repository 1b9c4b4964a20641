//! Savepoint-backed nested transactions

use std::panic::{AssertUnwindSafe, resume_unwind};
use std::sync::Arc;

use futures::FutureExt as _;
use tokio::sync::{Mutex, MutexGuard};

use crate::conn::Conn;
use crate::db::Db;
use crate::error::{Error, Result};
use crate::row::{ExecResult, Row, Rows};
use crate::value::Value;

/// Transaction handle lifecycle. Terminal states are absorbing: committing
/// or rolling back a finished handle is a no-op success, so unconditional
/// cleanup is safe to run redundantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
   Init,
   Running,
   Committed,
   RolledBack,
}

/// A logical transaction scoped to one savepoint on one connection.
///
/// Handles are created by [`Db::transact`] and passed to its callback; they
/// are capabilities that expire with the callback's scope. A handle kept
/// beyond that scope fails every operation with
/// [`Error::TransactionNotRunning`].
///
/// Nested [`transact`](Db::transact) calls on a handle open a child
/// savepoint; rolling the child back leaves the parent's writes intact.
#[derive(Clone)]
pub struct Transaction {
   inner: Arc<TxInner>,
}

struct TxInner {
   conn: Conn,
   savepoint: String,
   depth: u32,
   state: Mutex<TxState>,
}

impl Transaction {
   fn new(conn: Conn, savepoint: String, depth: u32) -> Self {
      Self {
         inner: Arc::new(TxInner {
            conn,
            savepoint,
            depth,
            state: Mutex::new(TxState::Init),
         }),
      }
   }

   /// A handle that was never started: every operation fails with
   /// [`Error::TransactionNotRunning`]. Used by the testkit fakes.
   #[cfg(any(test, feature = "testkit"))]
   pub(crate) fn detached() -> Self {
      Self::new(Conn::detached(), "tx_detached".into(), 1)
   }

   /// Nesting depth of this handle; the outermost transaction is depth 1.
   pub fn depth(&self) -> u32 {
      self.inner.depth
   }

   async fn begin(&self) -> Result<()> {
      let mut state = self.inner.state.lock().await;
      if *state != TxState::Init {
         return Err(Error::TransactionAlreadyStarted);
      }

      let sql = format!("SAVEPOINT {};", self.inner.savepoint);
      self.inner.conn.exec_inner(&sql, Vec::new()).await?;
      *state = TxState::Running;

      Ok(())
   }

   async fn commit(&self) -> Result<()> {
      let mut state = self.inner.state.lock().await;
      if *state != TxState::Running {
         return Ok(());
      }

      let sql = format!("RELEASE SAVEPOINT {};", self.inner.savepoint);
      self.inner.conn.exec_inner(&sql, Vec::new()).await?;
      *state = TxState::Committed;

      Ok(())
   }

   async fn rollback(&self) -> Result<()> {
      let mut state = self.inner.state.lock().await;
      if *state != TxState::Running {
         return Ok(());
      }

      let sql = format!("ROLLBACK TRANSACTION TO SAVEPOINT {};", self.inner.savepoint);
      self.inner.conn.exec_inner(&sql, Vec::new()).await?;
      *state = TxState::RolledBack;

      Ok(())
   }

   /// Lock the handle's state, failing unless the transaction is running.
   /// The returned guard serializes this handle's operations.
   async fn lock_running(&self) -> Result<MutexGuard<'_, TxState>> {
      let state = self.inner.state.lock().await;
      if *state != TxState::Running {
         return Err(Error::TransactionNotRunning);
      }
      Ok(state)
   }
}

impl Db for Transaction {
   async fn exec(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
      let _running = self.lock_running().await?;
      self.inner.conn.exec_inner(sql, args).await
   }

   async fn query(&self, sql: &str, args: Vec<Value>) -> Result<Rows> {
      let _running = self.lock_running().await?;
      self.inner.conn.query_inner(sql, args).await
   }

   async fn query_row(&self, sql: &str, args: Vec<Value>) -> Row {
      let running = match self.lock_running().await {
         Ok(guard) => guard,
         Err(error) => return Row::from_error(error),
      };

      let row = self.inner.conn.query_row_inner(sql, args).await;
      drop(running);
      row
   }

   async fn transact<F, Fut>(&self, f: F) -> Result<()>
   where
      F: FnOnce(Transaction) -> Fut + Send,
      Fut: Future<Output = Result<()>> + Send,
   {
      let _running = self.lock_running().await?;
      run(&self.inner.conn, self.inner.depth + 1, f).await
   }
}

impl std::fmt::Debug for Transaction {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Transaction")
         .field("savepoint", &self.inner.savepoint)
         .field("depth", &self.inner.depth)
         .finish_non_exhaustive()
   }
}

/// Open a savepoint, drive `f` against it, and settle the savepoint from
/// the outcome:
///
/// - `Ok(())` commits (releases the savepoint); a commit failure surfaces;
/// - `Err(RollbackRequested)` rolls back and reports overall success;
/// - any other error rolls back; if the rollback fails too, both errors are
///   returned together as [`Error::RollbackFailed`];
/// - a panic rolls back first, then resumes unwinding.
pub(crate) async fn run<F, Fut>(conn: &Conn, depth: u32, f: F) -> Result<()>
where
   F: FnOnce(Transaction) -> Fut + Send,
   Fut: Future<Output = Result<()>> + Send,
{
   let tx = Transaction::new(conn.clone(), conn.next_savepoint_name(), depth);
   tx.begin().await?;

   match AssertUnwindSafe(f(tx.clone())).catch_unwind().await {
      Err(panic) => {
         // The rollback's own error is discarded so the panic isn't masked.
         let _ = tx.rollback().await;
         resume_unwind(panic);
      }
      Ok(Err(error)) => {
         if let Err(rollback) = tx.rollback().await {
            return Err(Error::RollbackFailed {
               source: Box::new(error),
               rollback: Box::new(rollback),
            });
         }

         if matches!(error, Error::RollbackRequested) {
            Ok(())
         } else {
            Err(error)
         }
      }
      Ok(Ok(())) => tx.commit().await,
   }
}
