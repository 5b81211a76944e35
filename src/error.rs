//! Error types shared by every calculation engine
//!
//! Failures are always local to one calculation call. Degenerate math
//! (zero periods, zero principal, too few samples) is reported as invalid
//! input before any arithmetic runs, so callers never see NaN or infinity.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for engine operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured failure reported by an engine
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is out of range, non-finite, or makes the formula degenerate
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No configuration table exists for the requested year
    #[error("Unsupported year {year}: no {table} table loaded")]
    UnsupportedYear { year: i32, table: String },

    /// Configuration data violates an invariant (bracket order, missing ladder, ...)
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Address text could not be parsed
    #[error("Malformed address '{input}': {reason}")]
    MalformedAddress { input: String, reason: String },

    /// Prefix length outside the range of the address family
    #[error("Prefix length {prefix} out of range (0-{max})")]
    PrefixOutOfRange { prefix: u32, max: u32 },

    /// Expression text failed to tokenize or parse
    #[error("Expression error at position {position}: {reason}")]
    Expression { position: usize, reason: String },

    /// Reference data file could not be read
    #[error("Failed to load '{path}': {reason}")]
    DataLoad { path: String, reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_year(year: i32, table: impl Into<String>) -> Self {
        CalcError::UnsupportedYear {
            year,
            table: table.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        CalcError::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn malformed_address(input: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::MalformedAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn expression(position: usize, reason: impl Into<String>) -> Self {
        CalcError::Expression {
            position,
            reason: reason.into(),
        }
    }

    pub fn data_load(path: impl Into<String>, reason: impl ToString) -> Self {
        CalcError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnsupportedYear { .. } => "UNSUPPORTED_YEAR",
            CalcError::InvalidConfig { .. } => "INVALID_CONFIG",
            CalcError::MalformedAddress { .. } => "MALFORMED_ADDRESS",
            CalcError::PrefixOutOfRange { .. } => "PREFIX_OUT_OF_RANGE",
            CalcError::Expression { .. } => "EXPRESSION_ERROR",
            CalcError::DataLoad { .. } => "DATA_LOAD_ERROR",
        }
    }
}

/// Reject NaN and infinities before they reach a formula
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value, "must be a finite number"))
    }
}
