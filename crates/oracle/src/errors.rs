//! Oracle error types.
//!
//! Validation and precondition failures are separate variants so callers can
//! distinguish bad input shape from circuit-breaker rejections. Single-item
//! updates surface the first violated check; batch updates skip failing
//! entries instead.

use thiserror::Error;

/// Type alias for Result using the oracle error type.
pub type Result<T> = std::result::Result<T, OracleError>;

/// Errors produced by the rate oracle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// A rate type with this identifier is already registered.
    #[error("Rate type '{0}' already exists")]
    DuplicateRateType(String),

    /// Rate type identifiers must be non-blank.
    #[error("Rate type identifier must not be empty")]
    EmptyIdentifier,

    /// No rate type registered under this identifier.
    #[error("Unknown rate type '{0}'")]
    UnknownRateType(String),

    /// The rate type exists but has been deactivated.
    #[error("Rate type '{0}' is inactive")]
    RateInactive(String),

    /// Reference date does not parse as a plausible YYYYMMDD calendar date.
    #[error("Invalid reference date {0} (expected YYYYMMDD)")]
    InvalidReferenceDate(u32),

    /// The submitted reference date equals the current reading's date.
    #[error("Rate '{rate_type}' already has a reading for reference date {reference_date}")]
    DuplicateReferenceDate { rate_type: String, reference_date: u32 },

    /// Circuit breaker: value below the configured minimum.
    #[error("Value {value} below minimum {min} for rate '{rate_type}'")]
    ValueBelowMinimum { rate_type: String, value: i64, min: i64 },

    /// Circuit breaker: value above the configured maximum.
    #[error("Value {value} above maximum {max} for rate '{rate_type}'")]
    ValueAboveMaximum { rate_type: String, value: i64, max: i64 },

    /// The rate type exists but no reading has ever been accepted.
    #[error("No data available for rate '{0}'")]
    NoData(String),

    /// Bounds update rejected (min must not exceed max).
    #[error("Invalid bounds for rate '{rate_type}': min {min} > max {max}")]
    InvalidBounds { rate_type: String, min: i64, max: i64 },
}
