//! Database layer - connection pool, schema bootstrap, repositories
//!
//! # Design Principles
//!
//! - Connection pool with bounded acquire and statement timeouts
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Arithmetic on shared state happens inside one SQL statement

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{connect_with_retry, create_pool, DbConfig, RetryPolicy};
pub use sqlx::PgPool;
pub use repos::*;
