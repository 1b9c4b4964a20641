//! Teardown capability for pooled resources

/// Teardown hook driven by [`Pool::close`](crate::Pool::close).
///
/// This is a capability, not a requirement: any type may be pooled, and only
/// pools whose resource implements `Shutdown` offer `close`. The one trait
/// covers the full range of teardown shapes:
///
/// - resources whose teardown cannot fail use
///   [`Infallible`](std::convert::Infallible) as the error type;
/// - resources with fallible teardown report their own error type;
/// - cancellation-aware teardown is expressed by the returned future itself,
///   which callers may race against a deadline.
#[allow(async_fn_in_trait)]
pub trait Shutdown {
   /// Error reported when teardown fails.
   type Error: std::error::Error + Send + Sync + 'static;

   /// Consume the resource and release whatever it holds.
   async fn shutdown(self) -> Result<(), Self::Error>;
}
