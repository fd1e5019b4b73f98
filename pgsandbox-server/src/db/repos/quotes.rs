//! Quote repository
//!
//! Random message fetch and insert for the hello service.

use sqlx::PgPool;

use crate::models::QuoteText;
use super::DbError;

/// Quote repository
pub struct QuoteRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> QuoteRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One message picked uniformly at random, `None` if there are none.
    pub async fn random(&self) -> Result<Option<String>, DbError> {
        let message = sqlx::query_scalar::<_, String>(
            "SELECT message FROM public.hello ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(message)
    }

    /// Store a message, returning its id.
    pub async fn insert(&self, text: &QuoteText) -> Result<i32, DbError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO public.hello (message) VALUES ($1) RETURNING id",
        )
        .bind(text.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }
}
