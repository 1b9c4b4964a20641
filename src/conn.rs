//! A single physical connection to a SQLite database

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use sqlx::ConnectOptions as _;
use sqlx::Connection as _;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use tokio::sync::Mutex;

use crate::db::Db;
use crate::error::{Error, Result};
use crate::log::{QueryLogger, TracingQueryLogger};
use crate::row::{ExecResult, Row, Rows};
use crate::transaction::{self, Transaction};
use crate::value::{Value, bind_value};

// Process-wide connection id source. Monotonic, never reused, safe under
// concurrent increment.
static CONN_ID: AtomicU64 = AtomicU64::new(0);

/// One connection to a SQLite database.
///
/// `Conn` is a cheap-clone handle; clones share the same physical
/// connection. Queries on one connection are serialized by an internal
/// mutex, so a `Conn` may be used from concurrent tasks, but gets no
/// parallelism from it — use [`DbPool`](crate::DbPool) for that.
///
/// Once [`Conn::close`] has been called, every further operation fails with
/// [`Error::ConnectionClosed`].
#[derive(Clone)]
pub struct Conn {
   inner: Arc<ConnInner>,
}

struct ConnInner {
   /// Process-unique connection id; part of generated savepoint names
   id: u64,

   /// Per-connection savepoint sequence; see [`Conn::next_savepoint_name`]
   savepoint_seq: AtomicU64,

   engine: Mutex<Option<SqliteConnection>>,

   logger: RwLock<Arc<dyn QueryLogger>>,
}

impl Conn {
   /// Open a connection described by `source`: a path, `sqlite://` URL, or
   /// `:memory:`. The database file is created when missing.
   pub async fn open(source: &str) -> Result<Self> {
      let options = SqliteConnectOptions::from_str(source)?.create_if_missing(true);
      Self::open_with(options).await
   }

   /// Open a connection with explicit SQLx options.
   pub async fn open_with(options: SqliteConnectOptions) -> Result<Self> {
      let engine = options.connect().await?;

      Ok(Self {
         inner: Arc::new(ConnInner {
            id: CONN_ID.fetch_add(1, Ordering::SeqCst) + 1,
            savepoint_seq: AtomicU64::new(0),
            engine: Mutex::new(Some(engine)),
            logger: RwLock::new(Arc::new(TracingQueryLogger)),
         }),
      })
   }

   /// A handle with no engine behind it: every operation fails with
   /// [`Error::ConnectionClosed`]. Used by the testkit fakes.
   #[cfg(any(test, feature = "testkit"))]
   pub(crate) fn detached() -> Self {
      Self {
         inner: Arc::new(ConnInner {
            id: CONN_ID.fetch_add(1, Ordering::SeqCst) + 1,
            savepoint_seq: AtomicU64::new(0),
            engine: Mutex::new(None),
            logger: RwLock::new(Arc::new(TracingQueryLogger)),
         }),
      }
   }

   /// The process-unique id of this connection.
   pub fn id(&self) -> u64 {
      self.inner.id
   }

   /// Replace the query logger for this connection.
   pub fn set_logger(&self, logger: impl QueryLogger + 'static) {
      *self.inner.logger.write().expect("logger lock poisoned") = Arc::new(logger);
   }

   /// Verify the connection is still alive.
   pub async fn ping(&self) -> Result<()> {
      let mut engine = self.inner.engine.lock().await;
      let conn = engine.as_mut().ok_or(Error::ConnectionClosed)?;
      Ok(conn.ping().await?)
   }

   /// Close the connection and perform any necessary cleanup.
   ///
   /// Waits for the current query (if any) to finish. Closing an
   /// already-closed connection is a no-op.
   pub async fn close(&self) -> Result<()> {
      let mut engine = self.inner.engine.lock().await;
      match engine.take() {
         Some(conn) => Ok(conn.close().await?),
         None => Ok(()),
      }
   }

   /// Next savepoint name for this connection: `tx_<conn id>_<sequence>`.
   /// Unique for the life of the process, even with concurrent nested
   /// transactions on the same connection.
   pub(crate) fn next_savepoint_name(&self) -> String {
      let seq = self.inner.savepoint_seq.fetch_add(1, Ordering::SeqCst) + 1;
      format!("tx_{}_{}", self.inner.id, seq)
   }

   fn log_query(&self, sql: &str, args: &[Value]) {
      self
         .inner
         .logger
         .read()
         .expect("logger lock poisoned")
         .log_query(sql, args);
   }

   pub(crate) async fn exec_inner(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
      self.log_query(sql, &args);

      let mut engine = self.inner.engine.lock().await;
      let conn = engine.as_mut().ok_or(Error::ConnectionClosed)?;

      let mut query = sqlx::query(sql);
      for value in args {
         query = bind_value(query, value);
      }

      let result = query.execute(&mut *conn).await?;
      Ok(ExecResult {
         rows_affected: result.rows_affected(),
         last_insert_rowid: result.last_insert_rowid(),
      })
   }

   pub(crate) async fn query_inner(&self, sql: &str, args: Vec<Value>) -> Result<Rows> {
      self.log_query(sql, &args);

      let mut engine = self.inner.engine.lock().await;
      let conn = engine.as_mut().ok_or(Error::ConnectionClosed)?;

      let mut query = sqlx::query(sql);
      for value in args {
         query = bind_value(query, value);
      }

      let rows = query.fetch_all(&mut *conn).await?;
      Ok(Rows::new(rows))
   }

   pub(crate) async fn query_row_inner(&self, sql: &str, args: Vec<Value>) -> Row {
      self.log_query(sql, &args);

      let mut engine = self.inner.engine.lock().await;
      let conn = match engine.as_mut().ok_or(Error::ConnectionClosed) {
         Ok(conn) => conn,
         Err(error) => return Row::from_error(error),
      };

      let mut query = sqlx::query(sql);
      for value in args {
         query = bind_value(query, value);
      }

      Row::from_result(query.fetch_optional(&mut *conn).await.map_err(Error::from))
   }
}

impl Db for Conn {
   async fn exec(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
      self.exec_inner(sql, args).await
   }

   async fn query(&self, sql: &str, args: Vec<Value>) -> Result<Rows> {
      self.query_inner(sql, args).await
   }

   async fn query_row(&self, sql: &str, args: Vec<Value>) -> Row {
      self.query_row_inner(sql, args).await
   }

   async fn transact<F, Fut>(&self, f: F) -> Result<()>
   where
      F: FnOnce(Transaction) -> Fut + Send,
      Fut: Future<Output = Result<()>> + Send,
   {
      transaction::run(self, 1, f).await
   }
}

impl bounded_pool::Shutdown for Conn {
   type Error = Error;

   async fn shutdown(self) -> Result<()> {
      self.close().await
   }
}

impl std::fmt::Debug for Conn {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Conn").field("id", &self.inner.id).finish_non_exhaustive()
   }
}
