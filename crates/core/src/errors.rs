//! Core error types for the debenture engine.
//!
//! The taxonomy follows the operational contract: validation failures reject
//! bad input shape before any state change, precondition failures mean the
//! right shape in the wrong state, authorization failures come from the
//! external capability check, and external failures come from the payment
//! custody. Single-item operations surface the first violated check in a
//! fixed order.

use thiserror::Error;

use crate::lifecycle::DebentureStatus;
use crate::terms::RateLink;
use crate::traits::Role;
use lastro_oracle::OracleError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the debenture engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Oracle operation failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Terms validation failed: {0}")]
    Terms(#[from] TermsError),

    #[error("Valuation failed: {0}")]
    Valuation(#[from] ValuationError),

    #[error("Lifecycle operation failed: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Caller '{principal}' lacks the {role:?} capability")]
    Unauthorized { principal: String, role: Role },

    #[error("Payment transfer failed: {0}")]
    PaymentTransferFailed(String),
}

/// Validation errors raised when constructing debenture terms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermsError {
    #[error("Face value must be positive")]
    NonPositiveFaceValue,

    #[error("Unit count must be positive")]
    NonPositiveUnits,

    #[error("Maturity date {maturity} is not after issue date {issue}")]
    MaturityBeforeIssue {
        issue: chrono::NaiveDate,
        maturity: chrono::NaiveDate,
    },

    #[error("ISIN must not be blank")]
    BlankIsin,

    #[error("Coupon frequency must be positive")]
    NonPositiveCouponFrequency,
}

/// Errors from the valuation engine and accrual math.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    /// The operation requires an index- or DI-linked debenture.
    #[error("Rate link {0:?} is not linked to the required index")]
    IndexNotLinked(RateLink),

    /// The oracle reading's reference date is not newer than the last applied one.
    #[error("Index reading for reference date {reference_date} is not newer than last update {last_update}")]
    StaleIndexRead { reference_date: u32, last_update: u32 },

    /// Index or rate values must be strictly positive for ratio math.
    #[error("Non-positive index value {0}")]
    NonPositiveIndex(i64),

    /// Daily-factor inputs must be non-negative.
    #[error("Negative rate {0} supplied to the accrual engine")]
    NegativeRate(i64),
}

/// Precondition errors from the lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Debenture is {0:?}, operation requires Active")]
    NotActive(DebentureStatus),

    #[error("Coupon is not due until {next_due} (now {today})")]
    CouponNotDue {
        next_due: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    #[error("Coupon record {0} does not exist")]
    CouponNotFound(usize),

    #[error("Coupon record {0} has not been calculated")]
    CouponNotCalculated(usize),

    #[error("Coupon record {0} is already paid")]
    AlreadyPaid(usize),

    #[error("Coupon record {0} has not been paid yet")]
    CouponNotPaid(usize),

    #[error("Coupon record {0} was already claimed by this holder")]
    AlreadyClaimed(usize),

    #[error("Claims must proceed in order: expected index {expected}, requested {requested}")]
    ClaimOutOfOrder { expected: usize, requested: usize },

    #[error("Amortization entry {0} does not exist")]
    AmortizationNotFound(usize),

    #[error("Amortization entry {0} was already executed")]
    AlreadyExecuted(usize),

    #[error("Amortization entry is not due until {due} (now {today})")]
    AmortizationNotDue {
        due: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    #[error("Amortization basis must not be negative")]
    NegativeAmortization,

    #[error("Amortization amount {amount} exceeds current face value {vna}")]
    AmortizationExceedsVna { amount: i128, vna: i128 },

    #[error("Schedule dates must be strictly ascending")]
    NonAscendingSchedule,

    #[error("Schedule is append-only for this debenture")]
    ScheduleNotReplaceable,

    #[error("The {0} clause is not enabled for this debenture")]
    ClauseNotEnabled(String),

    #[error("Maturity date {maturity} not reached (now {today})")]
    MaturityNotReached {
        maturity: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    #[error("Custody holds {available}, operation requires {required}")]
    InsufficientCustody { available: i128, required: i128 },
}
