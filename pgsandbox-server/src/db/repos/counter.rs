//! PostgreSQL counter store
//!
//! The increment is a single `UPDATE .. SET value = value + $1 RETURNING value`,
//! so Postgres row locking serializes concurrent writers across every
//! process sharing the database. It runs in an explicit transaction: a
//! call abandoned on timeout drops the connection before COMMIT and the
//! update rolls back.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::counter::{CounterStore, StoreError};

/// Fixed identity of the one counter row.
const COUNTER_ID: i32 = 1;

#[derive(Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO public.counter (id, value) VALUES ($1, 0) ON CONFLICT (id) DO NOTHING")
            .bind(COUNTER_ID)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fetch_value(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT value FROM public.counter WHERE id = $1")
            .bind(COUNTER_ID)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::Missing)
    }

    async fn apply_delta(&self, delta: i64) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // bigint overflow raises 22003 and aborts the transaction
        let value = sqlx::query_scalar::<_, i64>(
            "UPDATE public.counter SET value = value + $1 WHERE id = $2 RETURNING value",
        )
        .bind(delta)
        .bind(COUNTER_ID)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::Missing)?;

        tx.commit().await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::counter::CounterService;
    use crate::db::{create_pool, migrations, DbConfig};

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p pgsandbox-server -- --ignored --test-threads=1

    async fn store() -> PgCounterStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let config = DbConfig {
            url: Some(url),
            max_connections: 20,
            ..DbConfig::default()
        };
        let pool = create_pool(&config).await.expect("pool creation failed");
        migrations::counter(&pool).await.expect("migration failed");
        PgCounterStore::new(pool)
    }

    async fn reset(store: &PgCounterStore) {
        store.ensure_initialized().await.unwrap();
        let current = store.fetch_value().await.unwrap();
        store.apply_delta(-current).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn ensure_initialized_twice_keeps_value() {
        let store = store().await;
        reset(&store).await;

        store.apply_delta(9).await.unwrap();
        store.ensure_initialized().await.unwrap();
        store.ensure_initialized().await.unwrap();

        assert_eq!(store.fetch_value().await.unwrap(), 9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    #[ignore = "requires database"]
    async fn concurrent_increments_are_not_lost() {
        let store = store().await;
        reset(&store).await;
        let counter = CounterService::new(Arc::new(store));

        let handles: Vec<_> = (0..300)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move { counter.increment(1).await })
            })
            .collect();

        for handle in handles {
            handle.await.expect("task panicked").expect("increment failed");
        }

        assert_eq!(counter.read().await.unwrap(), 300);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn overflow_rolls_back() {
        let store = store().await;
        reset(&store).await;

        store.apply_delta(i64::MAX).await.unwrap();
        assert!(store.apply_delta(1).await.is_err());
        assert_eq!(store.fetch_value().await.unwrap(), i64::MAX);

        reset(&store).await;
    }
}
