/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SQLite toolkit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Error from the connection pool (acquire timeout, builder failure,
   /// shutdown aggregation).
   #[error(transparent)]
   Pool(#[from] bounded_pool::Error),

   /// The query produced no rows where one was required.
   #[error("no rows returned by the query")]
   NoRows,

   /// The connection has been closed; no further operations are accepted.
   #[error("connection has been closed")]
   ConnectionClosed,

   /// A transaction handle was started twice.
   #[error("transaction already started")]
   TransactionAlreadyStarted,

   /// A transaction handle was used outside its running scope.
   #[error("transaction not running")]
   TransactionNotRunning,

   /// Sentinel returned from a transactional callback to request a rollback
   /// without failing the caller. `transact` swallows it and reports
   /// success.
   #[error("transaction rollback requested")]
   RollbackRequested,

   /// A transactional callback failed and the rollback attempt failed too.
   /// Both errors are preserved.
   #[error("transaction failed: {source}; rollback also failed: {rollback}")]
   RollbackFailed {
      source: Box<Error>,
      rollback: Box<Error>,
   },

   /// SQLite column type that cannot be decoded into a [`Value`](crate::Value).
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// A statement builder was finished without a table name.
   #[error("{0} statement requires a table name")]
   MissingTable(&'static str),

   /// A statement builder that writes values was finished without any.
   #[error("{0} statement requires at least one value")]
   MissingValues(&'static str),

   /// Record-to-struct decoding failed.
   #[error("decode error: {0}")]
   Decode(#[from] serde_json::Error),

   /// I/O error when reading migration files.
   #[error("io error: {0}")]
   Io(#[from] std::io::Error),

   /// Generic error for operations that don't fit other categories.
   #[error("{0}")]
   Other(String),
}

impl Error {
   /// `true` for the "no rows" sentinel, wherever it surfaced.
   pub fn is_no_rows(&self) -> bool {
      matches!(self, Error::NoRows)
   }

   /// `true` when the error is the saturation deadline from the pool.
   pub fn is_acquire_timeout(&self) -> bool {
      matches!(self, Error::Pool(bounded_pool::Error::AcquireTimeout))
   }
}
