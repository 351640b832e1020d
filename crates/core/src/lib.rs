//! Debenture valuation and lifecycle engine.
//!
//! This crate administers tokenized Brazilian corporate bonds (debentures)
//! whose coupon and principal values follow published macro rates. The hard
//! part is the indexation and valuation engine: accumulating daily DI
//! factors and periodic index ratios under the 252-business-day convention,
//! maintaining the updated face value (VNA) that amortization and coupons
//! both reference, and doing it all in integer fixed-point arithmetic with
//! bounded, auditable precision loss.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Debenture (lifecycle)               │
//! │  status machine · coupons · amortization · claims        │
//! └───────┬────────────────┬─────────────────┬───────────────┘
//!         │                │                 │
//!         ▼                ▼                 ▼
//!   ┌───────────┐   ┌─────────────┐   ┌───────────────┐
//!   │ Valuation │   │ Restriction │   │ Collaborators │
//!   │ VNA / DI  │   │  predicate  │   │ auth·custody· │
//!   └─────┬─────┘   └─────────────┘   │    ledger     │
//!         │                           └───────────────┘
//!         ▼
//!   ┌───────────┐          ┌──────────────────────┐
//!   │  Accrual  │ ◄──────  │ RateOracle           │
//!   │  (pure)   │  reads   │ (lastro-oracle crate)│
//!   └───────────┘          └──────────────────────┘
//! ```
//!
//! Time is always supplied by the caller as an explicit `now`; the engine
//! holds no clocks and runs no background tasks. Mutations on one instance
//! are serialized through [`DebentureHandle`].
//!
//! # Value Encoding
//!
//! - Face values, unit prices, coupon amounts: 6 decimals (`PU_PRECISION`).
//! - Oracle rates: 8 decimals (`RATE_PRECISION`, from `lastro-oracle`).
//! - DI accumulation factors: 9 decimals (`FACTOR_PRECISION`).
//! - Fixed rates and spreads: basis points.

pub mod accrual;
pub mod constants;
pub mod errors;
pub mod events;
pub mod fixed;
pub mod lifecycle;
pub mod restriction;
pub mod terms;
pub mod traits;
pub mod valuation;

mod restriction_tests;

pub use accrual::{accumulate, business_days_since, di_daily_factor, index_ratio, DiMode};
pub use constants::{
    BPS_DENOMINATOR, BUSINESS_DAYS_PER_YEAR, FACTOR_PRECISION, PU_PRECISION, VNA_FACTOR_PRECISION,
};
pub use errors::{Error, LifecycleError, Result, TermsError, ValuationError};
pub use events::{DomainEvent, DomainEventSink, MockDomainEventSink, NoOpDomainEventSink};
pub use lifecycle::{
    CouponRecord, Debenture, DebentureHandle, DebentureSnapshot, DebentureStatus,
};
pub use restriction::{TransferCode, TransferPolicy};
pub use terms::{
    AmortizationBasis, AmortizationEntry, ClaimPolicy, DebentureTerms, RateLink, SchedulePolicy,
};
pub use traits::{Authorization, BalanceLedger, PaymentCustody, Role, StaticAuthorization};
pub use valuation::{CouponQuote, DiAccrual, Valuation, VnaRecord};

// Re-exported so engine callers need only one crate for oracle wiring.
pub use lastro_oracle::{InMemoryRateOracle, OracleError, RateOracle};
