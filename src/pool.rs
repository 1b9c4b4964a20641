//! Pool-backed database facade with single-writer/multi-reader coordination

use std::ops::Deref;
use std::sync::Arc;

use bounded_pool::{Pool, PoolConfig};
use tokio::sync::{OwnedRwLockReadGuard, RwLock};

use crate::conn::Conn;
use crate::db::Db;
use crate::error::Result;
use crate::row::{ExecResult, Row, Rows};
use crate::transaction::{self, Transaction};
use crate::value::Value;

/// A bounded pool of [`Conn`]s behind the same [`Db`] contract as a bare
/// connection, so callers are agnostic to pooled-vs-direct.
///
/// SQLite allows one writer at a time across all connections, so the facade
/// adds a pool-wide read/write lock: [`exec`](Db::exec) and
/// [`transact`](Db::transact) serialize as writers, [`query`](Db::query) and
/// [`query_row`](Db::query_row) share read access.
///
/// Warning: the read lock is advisory at the API level. A mutating statement
/// issued through `query` — e.g.
/// `query("INSERT INTO t (id) VALUES (?) RETURNING id", …)` — does not lock
/// the pool for writing. Use [`DbPool::for_writing`] or `transact` for
/// mutating statements that return rows.
///
/// Checked-out connections return to the pool when the operation finishes,
/// including on panic. Do not call other pool operations while holding a
/// [`Reader`]: with all connections checked out they would wait on each
/// other forever.
pub struct DbPool {
   pool: Pool<Conn>,
   write_lock: Arc<RwLock<()>>,
}

impl DbPool {
   /// Create a pool of at most `size` connections built by `builder`.
   ///
   /// # Panics
   ///
   /// Panics if `size` is zero.
   pub fn new<F, Fut>(size: usize, builder: F) -> Self
   where
      F: Fn() -> Fut + Send + Sync + 'static,
      Fut: Future<Output = Result<Conn>> + Send + 'static,
   {
      Self::with_config(
         PoolConfig {
            max_size: size,
            ..Default::default()
         },
         builder,
      )
   }

   /// Create a pool with explicit [`PoolConfig`] settings (capacity,
   /// acquire deadline).
   pub fn with_config<F, Fut>(config: PoolConfig, builder: F) -> Self
   where
      F: Fn() -> Fut + Send + Sync + 'static,
      Fut: Future<Output = Result<Conn>> + Send + 'static,
   {
      let pool = Pool::new(config, move || {
         let build = builder();
         async move { build.await.map_err(|error| Box::new(error) as bounded_pool::BoxError) }
      });

      Self {
         pool,
         write_lock: Arc::new(RwLock::new(())),
      }
   }

   /// Create a pool of at most `size` connections to the database described
   /// by `source` (a path, `sqlite://` URL, or `:memory:`).
   pub fn open(source: impl Into<String>, size: usize) -> Self {
      let source = source.into();
      Self::new(size, move || {
         let source = source.clone();
         async move { Conn::open(&source).await }
      })
   }

   /// Number of idle connections currently in the pool.
   pub fn len(&self) -> usize {
      self.pool.len()
   }

   /// `true` when no idle connections are in the pool
   pub fn is_empty(&self) -> bool {
      self.pool.is_empty()
   }

   /// Close every idle connection, waiting for outstanding checkouts first.
   pub async fn close(&self) -> Result<()> {
      Ok(self.pool.close().await?)
   }

   /// Check out a connection for writer-exclusive access spanning multiple
   /// calls. The write lock is held for the whole callback.
   pub async fn for_writing<F, Fut, V>(&self, f: F) -> Result<V>
   where
      F: FnOnce(Conn) -> Fut + Send,
      Fut: Future<Output = Result<V>> + Send,
   {
      let conn = self.checkout().await?;
      let _write = self.write_lock.write().await;
      f(conn.handle()).await
   }

   /// Check out a connection for read-scoped access spanning multiple
   /// calls. The returned guard dereferences to [`Conn`] and returns the
   /// connection (and releases the read lock) on drop.
   pub async fn reader(&self) -> Result<Reader<'_>> {
      let conn = self.pool.get().await?;
      let lock = self.write_lock.clone().read_owned().await;

      Ok(Reader {
         pool: &self.pool,
         conn: Some(conn),
         _lock: lock,
      })
   }

   async fn checkout(&self) -> Result<PooledConn<'_>> {
      let conn = self.pool.get().await?;
      Ok(PooledConn {
         pool: &self.pool,
         conn: Some(conn),
      })
   }
}

impl Db for DbPool {
   async fn exec(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
      let conn = self.checkout().await?;
      let _write = self.write_lock.write().await;
      conn.exec_inner(sql, args).await
   }

   async fn query(&self, sql: &str, args: Vec<Value>) -> Result<Rows> {
      let conn = self.checkout().await?;
      let _read = self.write_lock.read().await;
      conn.query_inner(sql, args).await
   }

   async fn query_row(&self, sql: &str, args: Vec<Value>) -> Row {
      let conn = match self.checkout().await {
         Ok(conn) => conn,
         Err(error) => return Row::from_error(error),
      };

      let _read = self.write_lock.read().await;
      conn.query_row_inner(sql, args).await
   }

   async fn transact<F, Fut>(&self, f: F) -> Result<()>
   where
      F: FnOnce(Transaction) -> Fut + Send,
      Fut: Future<Output = Result<()>> + Send,
   {
      let conn = self.checkout().await?;
      let _write = self.write_lock.write().await;
      transaction::run(&conn, 1, f).await
   }
}

impl std::fmt::Debug for DbPool {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("DbPool").field("idle", &self.pool.len()).finish_non_exhaustive()
   }
}

/// Scoped checkout: returns the connection to the pool on drop, even when
/// the operation panics.
struct PooledConn<'p> {
   pool: &'p Pool<Conn>,
   conn: Option<Conn>,
}

impl PooledConn<'_> {
   /// A clone of the checked-out connection handle, for callbacks that take
   /// the connection by value.
   fn handle(&self) -> Conn {
      (**self).clone()
   }
}

impl Deref for PooledConn<'_> {
   type Target = Conn;

   fn deref(&self) -> &Conn {
      self.conn.as_ref().expect("connection already returned")
   }
}

impl Drop for PooledConn<'_> {
   fn drop(&mut self) {
      if let Some(conn) = self.conn.take() {
         self.pool.put(conn);
      }
   }
}

/// Read-scoped access to one pooled connection; see [`DbPool::reader`].
///
/// Holds the pool-wide read lock, so writers wait until this guard drops.
/// The read discipline is advisory: issuing a mutating statement through a
/// `Reader` is a caller error this type cannot detect.
pub struct Reader<'p> {
   pool: &'p Pool<Conn>,
   conn: Option<Conn>,
   _lock: OwnedRwLockReadGuard<()>,
}

impl Deref for Reader<'_> {
   type Target = Conn;

   fn deref(&self) -> &Conn {
      self.conn.as_ref().expect("connection already returned")
   }
}

impl Drop for Reader<'_> {
   fn drop(&mut self) {
      if let Some(conn) = self.conn.take() {
         self.pool.put(conn);
      }
   }
}

impl std::fmt::Debug for Reader<'_> {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Reader").finish_non_exhaustive()
   }
}
