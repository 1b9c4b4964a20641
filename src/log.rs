//! Query logging hooks

use tracing::debug;

use crate::value::Value;

/// Observes every SQL statement a connection sends to the engine, including
/// the savepoint commands issued by the transaction machinery.
///
/// Implementations must be cheap: the hook runs inline on the query path.
pub trait QueryLogger: Send + Sync {
   fn log_query(&self, sql: &str, args: &[Value]);
}

impl<T: QueryLogger + ?Sized> QueryLogger for std::sync::Arc<T> {
   fn log_query(&self, sql: &str, args: &[Value]) {
      (**self).log_query(sql, args);
   }
}

/// Default logger: forwards each query to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingQueryLogger;

impl QueryLogger for TracingQueryLogger {
   fn log_query(&self, sql: &str, args: &[Value]) {
      debug!(target: "dbkit::query", sql, args = args.len(), "query");
   }
}

/// Logger that discards everything.
#[derive(Debug, Default)]
pub struct NoopQueryLogger;

impl QueryLogger for NoopQueryLogger {
   fn log_query(&self, _sql: &str, _args: &[Value]) {}
}
