//! Command implementations for the pgsandbox CLI

pub mod count;
pub mod hello;
pub mod query;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use count::run_count;
pub use hello::run_hello;
pub use query::run_query;
