//! pgsandbox-server: small PostgreSQL-backed HTTP services
//!
//! Three standalone services share one stack:
//! - count: a durable counter that many clients increment concurrently
//! - hello: random message fetch and insert
//! - query: user existence lookup and registration
//!
//! Only the counter holds shared mutable state; see [`counter`].

pub mod counter;
pub mod db;
pub mod http;
pub mod models;

pub use counter::{CounterError, CounterService, CounterStore, MemoryStore, ServiceStatus};
pub use db::{DbConfig, PgCounterStore, RetryPolicy};
pub use http::{ApiError, ServerConfig, ServerError};
