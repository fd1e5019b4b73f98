//! Quote text validation

use super::ValidationError;

/// Maximum length for a stored message, in characters
const MAX_QUOTE_LEN: usize = 1000;

/// Validated message for the hello service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteText(String);

impl QuoteText {
    /// Message must contain something other than whitespace and fit in
    /// 1000 characters. Stored as given.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "msg" });
        }

        if s.chars().count() > MAX_QUOTE_LEN {
            return Err(ValidationError::TooLong {
                field: "msg",
                max: MAX_QUOTE_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_inner_whitespace() {
        let text = QuoteText::new("Привет, мир!").unwrap();
        assert_eq!(text.as_str(), "Привет, мир!");
    }

    #[test]
    fn rejects_blank() {
        assert!(matches!(
            QuoteText::new(" \n\t").unwrap_err(),
            ValidationError::Empty { field: "msg" }
        ));
    }

    #[test]
    fn rejects_too_long() {
        let err = QuoteText::new(&"x".repeat(1001)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 1000, .. }));
    }
}
