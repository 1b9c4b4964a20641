//! Error types for bounded-pool

/// Boxed error type used at the generic boundary between the pool and the
/// caller-supplied builder / shutdown hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may occur when working with a [`Pool`](crate::Pool)
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The pool stayed saturated past the configured acquire deadline.
   /// Retryable: capacity is unchanged and a later call may succeed.
   #[error("timed out waiting for a pool resource")]
   AcquireTimeout,

   /// The resource builder failed. The reserved capacity slot has been
   /// released back to the pool, so the pool is not permanently degraded.
   #[error("resource builder failed: {0}")]
   Build(#[source] BoxError),

   /// One or more resources failed their shutdown hook during
   /// [`Pool::close`](crate::Pool::close). Every failure is collected here
   /// rather than only the first.
   #[error("pool closed with {} shutdown error(s)", .sources.len())]
   Close { sources: Vec<BoxError> },
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_close_error_reports_count() {
      let err = Error::Close {
         sources: vec!["a".into(), "b".into()],
      };
      assert!(err.to_string().contains("2 shutdown error(s)"));
   }

   #[test]
   fn test_build_error_preserves_source() {
      let err = Error::Build("no file descriptors".into());
      assert!(err.to_string().contains("no file descriptors"));
      assert!(std::error::Error::source(&err).is_some());
   }
}
