//! Error types for ray enumeration.
//!
//! Every fallible operation in the crate reports a [`RayEnumError`]. The
//! kinds mirror the failure modes of the arithmetic, the vector model, the
//! input checks performed at the start of a run, and cooperative
//! cancellation.

use thiserror::Error;
use std::fmt;

/// Top-level error type for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RayEnumError {
    /// Malformed integer literal
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Two vectors (or a vector and a matrix row) of different lengths
    #[error("Dimension mismatch: expected length {expected}, found {found}")]
    DimensionMismatch {
        /// Length required by the operation
        expected: usize,
        /// Length actually supplied
        found: usize,
    },

    /// Index outside the declared extent of a vector or matrix
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending index
        index: usize,
        /// The extent that was exceeded
        len: usize,
    },

    /// Arithmetic that needs a finite value was applied to infinity
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Inconsistent input detected before an enumeration starts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The run observed its cancellation flag
    #[error("Enumeration cancelled")]
    Cancelled,
}

impl RayEnumError {
    /// Build an [`RayEnumError::InvalidOperation`].
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Build an [`RayEnumError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check that `found` equals `expected`.
    pub fn check_dimension(expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { expected, found })
        }
    }

    /// Check that `index < len`.
    pub fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Self::IndexOutOfBounds { index, len })
        }
    }
}

/// Error while parsing an integer literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// The text that failed to parse
    pub input: String,
    /// The kind of parse error
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, input: &str) -> Self {
        let message = match kind {
            ParseErrorKind::Empty => "empty integer literal",
            ParseErrorKind::InvalidDigit => "invalid digit in integer literal",
            ParseErrorKind::MisplacedSign => "misplaced sign in integer literal",
        };
        Self {
            message: message.to_string(),
            input: input.to_string(),
            kind,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (found: {:?})", self.message, self.input)
    }
}

/// What went wrong in a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Nothing but whitespace (or a lone sign)
    Empty,
    /// A character that is not a decimal digit
    InvalidDigit,
    /// A sign character after the first position
    MisplacedSign,
}

/// Result type using RayEnumError.
pub type Result<T> = std::result::Result<T, RayEnumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RayEnumError::from(ParseError::new(ParseErrorKind::InvalidDigit, "12x"));
        let s = format!("{}", err);
        assert!(s.contains("invalid digit"));
        assert!(s.contains("12x"));
    }

    #[test]
    fn test_dimension_checks() {
        assert!(RayEnumError::check_dimension(3, 3).is_ok());
        assert_eq!(
            RayEnumError::check_dimension(3, 4),
            Err(RayEnumError::DimensionMismatch { expected: 3, found: 4 })
        );
        assert_eq!(
            RayEnumError::check_index(5, 5),
            Err(RayEnumError::IndexOutOfBounds { index: 5, len: 5 })
        );
    }
}
