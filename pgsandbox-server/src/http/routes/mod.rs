//! Route handlers organized by service

pub mod count;
pub mod health;
pub mod quotes;
pub mod users;
