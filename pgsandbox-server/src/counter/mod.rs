//! Shared counter - the only mutable state pgsandbox owns
//!
//! [`CounterService`] is built once at startup and handed to the HTTP layer
//! through router state. Atomicity lives in the store: `apply_delta` adds the
//! delta in a single step (`UPDATE .. SET value = value + $1 .. RETURNING`
//! for Postgres, one mutex section for [`MemoryStore`]). The service therefore
//! holds no lock of its own, reads never wait on each other, and several
//! processes may share one database without losing updates.

pub mod memory;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use memory::MemoryStore;

/// Upper bound on a single store round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure reported by a [`CounterStore`] adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("counter record is missing")]
    Missing,

    #[error("adding {delta} to {value} overflows")]
    Overflow { value: i64, delta: i64 },

    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// True when the store could not be reached at all, as opposed to a
    /// statement that reached it and was rejected.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout(_) => true,
            Self::Sqlx(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            Self::Missing | Self::Overflow { .. } => false,
        }
    }
}

/// Error surfaced by [`CounterService`].
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// Connectivity, timeout, or constraint failure. The stored value is
    /// whatever it was before the call.
    #[error("counter store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

/// Durable home of the single counter record.
///
/// `apply_delta` is the atomicity boundary: implementations must add the
/// delta and return the result as one indivisible step, and must leave the
/// value untouched when they return an error.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Create the record with value 0 unless it already exists.
    async fn ensure_initialized(&self) -> Result<(), StoreError>;

    async fn fetch_value(&self) -> Result<i64, StoreError>;

    async fn apply_delta(&self, delta: i64) -> Result<i64, StoreError>;
}

/// Operational state as observed by the most recent store round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Ready,
    Unavailable,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Counter operations shared by every request handler.
#[derive(Clone)]
pub struct CounterService {
    inner: Arc<CounterServiceInner>,
}

struct CounterServiceInner {
    store: Arc<dyn CounterStore>,
    timeout: Duration,
    available: AtomicBool,
}

impl CounterService {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn CounterStore>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CounterServiceInner {
                store,
                timeout,
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Make sure the counter record exists. Safe to call on every start.
    pub async fn initialize(&self) -> Result<(), CounterError> {
        self.call(self.inner.store.ensure_initialized()).await?;
        info!("counter record ready");
        Ok(())
    }

    /// Current persisted value.
    pub async fn read(&self) -> Result<i64, CounterError> {
        let value = self.call(self.inner.store.fetch_value()).await?;
        debug!(value, "counter read");
        Ok(value)
    }

    /// Add `delta` (any sign) and return the value it produced.
    ///
    /// Fails without touching the stored value if the store rejects the
    /// update or does not answer within the configured timeout. Never
    /// retried here; the caller decides.
    pub async fn increment(&self, delta: i64) -> Result<i64, CounterError> {
        let value = self.call(self.inner.store.apply_delta(delta)).await?;
        debug!(delta, value, "counter incremented");
        Ok(value)
    }

    pub fn status(&self) -> ServiceStatus {
        if self.inner.available.load(Ordering::Acquire) {
            ServiceStatus::Ready
        } else {
            ServiceStatus::Unavailable
        }
    }

    async fn call<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, CounterError> {
        let result = match tokio::time::timeout(self.inner.timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.inner.timeout)),
        };

        match result {
            Ok(value) => {
                self.mark_available(true);
                Ok(value)
            }
            Err(e) => {
                if e.is_connectivity() {
                    self.mark_available(false);
                }
                Err(CounterError::StoreUnavailable(e))
            }
        }
    }

    fn mark_available(&self, available: bool) {
        let was = self.inner.available.swap(available, Ordering::AcqRel);
        if was == available {
            return;
        }
        if available {
            info!("counter store reachable again");
        } else {
            warn!("counter store unavailable");
        }
    }
}
