//! Semaphore-bounded resource pool with LIFO reuse

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{BoxError, Error, Result};
use crate::shutdown::Shutdown;

/// Configuration for a [`Pool`]
///
/// # Examples
///
/// ```
/// use bounded_pool::PoolConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = PoolConfig::default();
///
/// // Override just one field
/// let config = PoolConfig {
///    max_size: 2,
///    ..Default::default()
/// };
///
/// // Fail saturated checkouts instead of waiting forever
/// let config = PoolConfig {
///    max_size: 2,
///    acquire_timeout: Some(Duration::from_millis(250)),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
   /// Maximum number of resources that may be live (checked out or idle)
   /// at any one time
   ///
   /// Default: 4
   pub max_size: usize,

   /// How long [`Pool::get`] may wait for a free capacity slot before
   /// failing with [`Error::AcquireTimeout`]. `None` waits indefinitely.
   ///
   /// Default: `None`
   pub acquire_timeout: Option<Duration>,
}

impl Default for PoolConfig {
   fn default() -> Self {
      Self {
         max_size: 4,
         acquire_timeout: None,
      }
   }
}

type BuildFuture<T> = Pin<Box<dyn Future<Output = std::result::Result<T, BoxError>> + Send>>;
type Builder<T> = Box<dyn Fn() -> BuildFuture<T> + Send + Sync>;

/// A bounded, concurrency-safe pool of resources of type `T`.
///
/// Resources live in exactly one of three states: checked out, idle on the
/// free list, or not yet constructed. The invariant
/// `checked_out + idle ≤ max_size` holds at all times; the semaphore admits
/// checkouts and the free list recycles returns most-recently-used first.
///
/// The pool knows nothing about what `T` is. Construction goes through the
/// async builder supplied at [`Pool::new`]; teardown goes through the
/// optional [`Shutdown`] capability.
pub struct Pool<T> {
   max_size: u32,
   acquire_timeout: Option<Duration>,
   semaphore: Semaphore,
   checked_out: AtomicUsize,
   idle: Mutex<Vec<T>>,
   builder: Builder<T>,
}

impl<T: Send + 'static> Pool<T> {
   /// Create a pool that builds resources on demand with `builder`.
   ///
   /// # Panics
   ///
   /// Panics if `config.max_size` is zero.
   pub fn new<F, Fut>(config: PoolConfig, builder: F) -> Self
   where
      F: Fn() -> Fut + Send + Sync + 'static,
      Fut: Future<Output = std::result::Result<T, BoxError>> + Send + 'static,
   {
      assert!(config.max_size >= 1, "pool size must be at least 1");
      let max_size = u32::try_from(config.max_size).expect("pool size exceeds u32::MAX");

      Self {
         max_size,
         acquire_timeout: config.acquire_timeout,
         semaphore: Semaphore::new(config.max_size),
         checked_out: AtomicUsize::new(0),
         idle: Mutex::new(Vec::with_capacity(config.max_size)),
         builder: Box::new(move || -> BuildFuture<T> { Box::pin(builder()) }),
      }
   }

   /// Check a resource out of the pool.
   ///
   /// Waits for a capacity slot (respecting the configured
   /// `acquire_timeout`), then hands out the most-recently-returned idle
   /// resource, or builds a new one when the free list is empty. A builder
   /// failure releases the slot, so capacity never shrinks.
   ///
   /// Cancel-safe: dropping the returned future before it resolves consumes
   /// no capacity and loses no idle resource.
   pub async fn get(&self) -> Result<T> {
      let permit = match self.acquire_timeout {
         Some(limit) => tokio::time::timeout(limit, self.semaphore.acquire())
            .await
            .map_err(|_| Error::AcquireTimeout)?,
         None => self.semaphore.acquire().await,
      }
      .expect("pool semaphore is never closed");

      let reused = self.idle.lock().expect("pool free list lock poisoned").pop();

      let value = match reused {
         Some(value) => value,
         None => match (self.builder)().await {
            Ok(value) => value,
            // The permit drops here, releasing the reserved slot.
            Err(source) => return Err(Error::Build(source)),
         },
      };

      permit.forget();
      self.checked_out.fetch_add(1, Ordering::SeqCst);

      Ok(value)
   }

   /// Return a checked-out resource to the pool.
   ///
   /// # Panics
   ///
   /// Panics when called without a matching outstanding [`Pool::get`]: an
   /// over-release would corrupt the capacity bound, so it is treated as a
   /// fatal caller bug rather than silently accepted.
   pub fn put(&self, value: T) {
      let matched = self
         .checked_out
         .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
      if matched.is_err() {
         panic!("bounded-pool: put without a matching outstanding get");
      }

      self.idle.lock().expect("pool free list lock poisoned").push(value);
      self.semaphore.add_permits(1);
   }

   /// Shut down every idle resource.
   ///
   /// Acquires the entire pool capacity first, so close waits until all
   /// outstanding resources have been returned. Each idle resource's
   /// [`Shutdown`] hook runs exactly once; failures are aggregated into
   /// [`Error::Close`] instead of short-circuiting. Afterwards the capacity
   /// is released and the pool is usable again (new resources will be
   /// built on demand).
   pub async fn close(&self) -> Result<()>
   where
      T: Shutdown,
   {
      let _all = match self.acquire_timeout {
         Some(limit) => tokio::time::timeout(limit, self.semaphore.acquire_many(self.max_size))
            .await
            .map_err(|_| Error::AcquireTimeout)?,
         None => self.semaphore.acquire_many(self.max_size).await,
      }
      .expect("pool semaphore is never closed");

      let idle = std::mem::take(&mut *self.idle.lock().expect("pool free list lock poisoned"));
      debug!(count = idle.len(), "shutting down idle pool resources");

      let mut sources: Vec<BoxError> = Vec::new();
      for value in idle {
         if let Err(error) = value.shutdown().await {
            sources.push(Box::new(error));
         }
      }

      if sources.is_empty() {
         Ok(())
      } else {
         Err(Error::Close { sources })
      }
   }

   /// Number of idle resources currently on the free list.
   ///
   /// This is not the capacity and not the in-flight count; it exists so
   /// recycling behavior is observable.
   pub fn len(&self) -> usize {
      self.idle.lock().expect("pool free list lock poisoned").len()
   }

   /// `true` when no idle resources are on the free list
   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }

   /// The configured capacity
   pub fn max_size(&self) -> usize {
      self.max_size as usize
   }
}

impl<T> std::fmt::Debug for Pool<T> {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Pool")
         .field("max_size", &self.max_size)
         .field("acquire_timeout", &self.acquire_timeout)
         .field("checked_out", &self.checked_out.load(Ordering::SeqCst))
         .finish_non_exhaustive()
   }
}
