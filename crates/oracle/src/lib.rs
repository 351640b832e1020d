//! Lastro Rate Oracle Crate
//!
//! Validated, versioned time series for Brazilian macroeconomic reference
//! rates (IPCA, CDI, SELIC, PTAX, IGPM, TR), consumed by the debenture
//! valuation engine in `lastro-core` and fed by an external publisher.
//!
//! # Overview
//!
//! The oracle provides:
//! - Circuit-breakered acceptance: per-rate inclusive min/max bounds
//! - Versioning: monotonic round numbers and an append-only history
//! - Staleness: heartbeat-aware `is_stale` evaluated against a supplied "now"
//! - Best-effort batch ingestion that skips bad entries instead of aborting
//! - Monitoring-only statistical anomaly detection (spikes, staleness,
//!   velocity)
//!
//! # Architecture
//!
//! ```text
//! +-----------------+     +------------------+
//! |  Feed Publisher | --> |    RateOracle    |  (validation + versioning)
//! +-----------------+     +------------------+
//!                             |           |
//!                             v           v
//!                    +--------------+  +-----------------+
//!                    | RateReading  |  | AnomalyDetector |  (monitoring only)
//!                    |   history    |  +-----------------+
//!                    +--------------+
//!                             |
//!                             v
//!                    +------------------+
//!                    | Valuation engine |  (lastro-core)
//!                    +------------------+
//! ```
//!
//! # Value Encoding
//!
//! All values are signed integers scaled by 10^8 (Chainlink fiat-feed
//! convention): a 10.90% CDI is `1_090_000_000`, a 5.1234 BRL/USD PTAX is
//! `512_340_000`.

pub mod anomaly;
pub mod errors;
pub mod events;
pub mod model;
pub mod store;

mod store_tests;

pub use anomaly::{AnomalyCheck, AnomalyDetector, AnomalyKind, AnomalyRecord, Severity};
pub use errors::{OracleError, Result};
pub use events::{MockOracleEventSink, NoOpOracleEventSink, OracleEvent, OracleEventSink};
pub use model::{
    builtin_rate_metadata, RateMetadata, RateReading, RateUpdate, RATE_CDI, RATE_DECIMALS,
    RATE_IGPM, RATE_IPCA, RATE_PRECISION, RATE_PTAX, RATE_SELIC, RATE_TR,
};
pub use store::{InMemoryRateOracle, RateOracle};
