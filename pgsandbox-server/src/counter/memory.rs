//! In-process counter store
//!
//! Holds the value behind a mutex so `apply_delta` is a single critical
//! section. Nothing survives a restart. Used by tests and by
//! `pgsandbox count --in-memory`; the outage and latency switches let tests
//! exercise the failure paths of [`CounterService`](super::CounterService).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{CounterStore, StoreError};

#[derive(Debug)]
pub struct MemoryStore {
    /// `None` until `ensure_initialized` runs.
    value: Mutex<Option<i64>>,
    available: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            available: AtomicBool::new(true),
            latency: Mutex::new(None),
        }
    }

    /// Simulate the store going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Delay every call by `latency` before it touches the value.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *lock(&self.latency) = latency;
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if !self.available.load(Ordering::Acquire) {
            return Err(StoreError::Unreachable("memory store offline".into()));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the guard cannot leave a half-written i64.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        self.round_trip().await?;
        lock(&self.value).get_or_insert(0);
        Ok(())
    }

    async fn fetch_value(&self) -> Result<i64, StoreError> {
        self.round_trip().await?;
        let value = *lock(&self.value);
        value.ok_or(StoreError::Missing)
    }

    async fn apply_delta(&self, delta: i64) -> Result<i64, StoreError> {
        self.round_trip().await?;
        let mut guard = lock(&self.value);
        let value = guard.ok_or(StoreError::Missing)?;
        let next = value
            .checked_add(delta)
            .ok_or(StoreError::Overflow { value, delta })?;
        *guard = Some(next);
        Ok(next)
    }
}
