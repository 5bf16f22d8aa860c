//! Structured errors for unit resolution and quantity arithmetic
//!
//! Resolution and arithmetic are pure, so every error here is permanent:
//! repeating the call with the same input fails the same way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const MALFORMED_SPEC: &str = "MALFORMED_SPEC";
    pub const UNIT_MISMATCH: &str = "UNIT_MISMATCH";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const INVALID_TABLES: &str = "INVALID_TABLES";
}

/// Errors raised by the unit engine
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitError {
    /// No base entry, no prefix decomposition and no specification
    #[error("Unknown unit: {symbol}")]
    UnknownUnit { symbol: String },

    /// Specification string matches neither the ratio nor the affine form
    #[error("Malformed specification for '{symbol}': \"{spec}\" ({reason})")]
    MalformedSpecification {
        symbol: String,
        spec: String,
        reason: String,
    },

    /// Arithmetic between quantities whose dimension vectors differ
    #[error("Units do not match: {left} [{left_dims}] vs {right} [{right_dims}]")]
    UnitMismatch {
        left: String,
        right: String,
        left_dims: String,
        right_dims: String,
    },

    /// Numeric token of a quantity string is not a number
    #[error("Invalid number: '{text}'")]
    InvalidNumber { text: String },

    /// Unit tables could not be loaded
    #[error("Invalid unit tables: {reason}")]
    InvalidTables { reason: String },
}

impl UnitError {
    pub fn unknown_unit(symbol: impl Into<String>) -> Self {
        Self::UnknownUnit { symbol: symbol.into() }
    }

    pub fn malformed(
        symbol: impl Into<String>,
        spec: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedSpecification {
            symbol: symbol.into(),
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    pub fn mismatch(
        left: impl Into<String>,
        right: impl Into<String>,
        left_dims: impl ToString,
        right_dims: impl ToString,
    ) -> Self {
        Self::UnitMismatch {
            left: left.into(),
            right: right.into(),
            left_dims: left_dims.to_string(),
            right_dims: right_dims.to_string(),
        }
    }

    pub fn invalid_number(text: impl Into<String>) -> Self {
        Self::InvalidNumber { text: text.into() }
    }

    pub fn invalid_tables(reason: impl Into<String>) -> Self {
        Self::InvalidTables { reason: reason.into() }
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownUnit { .. } => codes::UNKNOWN_UNIT,
            Self::MalformedSpecification { .. } => codes::MALFORMED_SPEC,
            Self::UnitMismatch { .. } => codes::UNIT_MISMATCH,
            Self::InvalidNumber { .. } => codes::INVALID_NUMBER,
            Self::InvalidTables { .. } => codes::INVALID_TABLES,
        }
    }

    /// Hint for fixing the error
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::UnknownUnit { .. } => "Check spelling or define the unit with a specification",
            Self::MalformedSpecification { .. } => {
                "Use \"<scale> <definition>\" or \"<definition>-<offset>\""
            }
            Self::UnitMismatch { .. } => "Only quantities with equal dimensions can be combined",
            Self::InvalidNumber { .. } => "Write quantities as \"<number> <unit>\"",
            Self::InvalidTables { .. } => "Check the unit table JSON document",
        }
    }
}

impl From<serde_json::Error> for UnitError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_tables(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(UnitError::unknown_unit("xyzzy").code(), codes::UNKNOWN_UNIT);
        assert_eq!(UnitError::malformed("x", "1", "bad").code(), codes::MALFORMED_SPEC);
        assert_eq!(UnitError::mismatch("m", "s", "a", "b").code(), codes::UNIT_MISMATCH);
        assert_eq!(UnitError::invalid_number("x").code(), codes::INVALID_NUMBER);
        assert_eq!(UnitError::invalid_tables("x").code(), codes::INVALID_TABLES);
    }

    #[test]
    fn test_display() {
        let err = UnitError::unknown_unit("xyzzy");
        assert_eq!(err.to_string(), "Unknown unit: xyzzy");

        let err = UnitError::malformed("foo", "abc def", "non-numeric scale");
        assert_eq!(
            err.to_string(),
            "Malformed specification for 'foo': \"abc def\" (non-numeric scale)"
        );
    }

    #[test]
    fn test_serialize_tagged() {
        let err = UnitError::unknown_unit("xyzzy");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "unknown_unit");
        assert_eq!(json["symbol"], "xyzzy");
    }

    #[test]
    fn test_from_json_error() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: UnitError = bad.into();
        assert_eq!(err.code(), codes::INVALID_TABLES);
    }
}
