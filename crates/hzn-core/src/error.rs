//! Unified error type for the horizon crates.
//!
//! Library code that manipulates the network model returns [`HznResult`].
//! Higher layers (I/O, rules, CLI) wrap these in `anyhow` with context.

use thiserror::Error;

/// Error type for network-model operations.
#[derive(Error, Debug)]
pub enum HznError {
    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network structure errors (duplicate names, unknown components)
    #[error("Network error: {0}")]
    Network(String),
}

/// Convenience type alias for Results using HznError.
pub type HznResult<T> = Result<T, HznError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HznError::Network("generator 'a' already defined".into());
        assert!(err.to_string().contains("Network error"));
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = HznError::Parse("invalid timestamp '2013-13-01'".into());
        assert_eq!(err.to_string(), "Parse error: invalid timestamp '2013-13-01'");
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> HznResult<()> {
            Err(HznError::Validation("test".into()))
        }

        fn outer() -> HznResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
