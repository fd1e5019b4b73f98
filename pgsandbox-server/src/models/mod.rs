//! Request models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod quote;
pub mod user;
pub mod validation;

pub use quote::QuoteText;
pub use user::UserName;
pub use validation::ValidationError;
