//! # bounded-pool
//!
//! A small async resource pool that bounds concurrent checkouts with a
//! semaphore, recycles idle resources most-recently-returned first, and
//! constructs new resources lazily.
//!
//! ## Core Types
//!
//! - **[`Pool`]**: the pool itself, generic over any resource type
//! - **[`PoolConfig`]**: capacity and acquire-deadline settings
//! - **[`Shutdown`]**: optional teardown capability for pooled resources
//! - **[`Error`]**: error type for pool operations
//!
//! ## Architecture
//!
//! - **Semaphore-bounded checkouts**: at most `max_size` resources are live
//!   at any time; additional callers wait (back-pressure) instead of growing
//!   the resource count without bound
//! - **LIFO reuse**: the most-recently-returned idle resource is handed out
//!   first, favoring cache-warm resources
//! - **Lazy construction**: resources are built by an async builder only
//!   when no idle resource is available
//! - **Uniform teardown**: [`Pool::close`] waits for every outstanding
//!   resource to come back, then runs each idle resource's [`Shutdown`]
//!   hook, aggregating failures instead of dropping them

mod error;
mod pool;
mod shutdown;

pub use error::{BoxError, Error, Result};
pub use pool::{Pool, PoolConfig};
pub use shutdown::Shutdown;
