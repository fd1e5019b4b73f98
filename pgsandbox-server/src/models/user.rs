//! User name validation
//!
//! Matches the `users.name VARCHAR(255)` column.

use super::ValidationError;

/// Maximum length for user names, in characters
const MAX_USER_NAME_LEN: usize = 255;

/// Validated, trimmed user name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    /// Create a user name from raw input.
    ///
    /// Surrounding whitespace is dropped; what remains must be
    /// non-empty and at most 255 characters.
    ///
    /// # Example
    /// ```
    /// use pgsandbox_server::models::UserName;
    ///
    /// assert_eq!(UserName::new("  Men-fish ").unwrap().as_str(), "Men-fish");
    /// assert!(UserName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }

        if s.chars().count() > MAX_USER_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_USER_NAME_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
