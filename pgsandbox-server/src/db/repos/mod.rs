//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the shared pool, one repo value per request
//! - Handles conflicts via ON CONFLICT (no check-then-insert)
//! - Uses transactions where a failure must roll back

pub mod counter;
pub mod quotes;
pub mod users;

pub use counter::PgCounterStore;
pub use quotes::QuoteRepo;
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("conflict: {resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },
}
