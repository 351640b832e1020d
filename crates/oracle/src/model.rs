//! Rate oracle domain models.
//!
//! All rate values follow the Chainlink fiat-feed convention: signed integers
//! scaled by 10^8. A CDI of 10.90% per year is stored as `1_090_000_000`.
//! Reference dates use YYYYMMDD integer semantics as published by the BCB
//! open-data API.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Decimal places for all oracle answers (Chainlink fiat-feed standard).
pub const RATE_DECIMALS: u32 = 8;

/// Scale factor for oracle answers: 10^8.
pub const RATE_PRECISION: i64 = 100_000_000;

/// Built-in rate identifiers.
pub const RATE_IPCA: &str = "IPCA";
pub const RATE_CDI: &str = "CDI";
pub const RATE_SELIC: &str = "SELIC";
pub const RATE_PTAX: &str = "PTAX";
pub const RATE_IGPM: &str = "IGPM";
pub const RATE_TR: &str = "TR";

// =============================================================================
// Rate Reading
// =============================================================================

/// A single validated oracle observation.
///
/// Immutable once created. When a newer reading is accepted for the same rate
/// type, the superseded reading moves to the append-only history list.
///
/// # Fields
///
/// * `rate_type` - Registered rate identifier (e.g., "CDI")
/// * `value` - Signed value scaled by 10^8
/// * `observed_at` - Wall-clock time the oracle accepted the reading
/// * `reference_date` - Calendar date the value refers to, as YYYYMMDD
/// * `source` - Source label supplied by the feed publisher (e.g., "BCB-12")
/// * `submitted_by` - Principal that submitted the update
/// * `round` - Monotonic per-rate round number, starting at 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateReading {
    pub rate_type: String,
    pub value: i64,
    pub observed_at: DateTime<Utc>,
    pub reference_date: u32,
    pub source: String,
    pub submitted_by: String,
    pub round: u64,
}

impl RateReading {
    /// The reading's value as a decimal percentage (or plain ratio for PTAX).
    pub fn value_as_decimal(&self) -> Decimal {
        Decimal::new(self.value, RATE_DECIMALS)
    }
}

// =============================================================================
// Rate Metadata
// =============================================================================

/// Per-rate-type configuration: circuit-breaker bounds, heartbeat, activity.
///
/// Bounds apply at acceptance time. Tightening bounds after readings were
/// accepted can make a historical point look anomalous in hindsight; this is
/// expected and history is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateMetadata {
    pub display_name: String,
    pub description: String,
    /// Always [`RATE_DECIMALS`]; carried so consumers need no out-of-band knowledge.
    pub decimal_places: u32,
    /// Maximum expected time between accepted updates.
    #[serde(with = "heartbeat_seconds")]
    pub heartbeat: Duration,
    /// Circuit breaker: minimum acceptable value (inclusive), scaled by 10^8.
    pub min_value: i64,
    /// Circuit breaker: maximum acceptable value (inclusive), scaled by 10^8.
    pub max_value: i64,
    pub active: bool,
}

impl RateMetadata {
    pub fn new(
        display_name: impl Into<String>,
        description: impl Into<String>,
        heartbeat: Duration,
        min_value: i64,
        max_value: i64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            description: description.into(),
            decimal_places: RATE_DECIMALS,
            heartbeat,
            min_value,
            max_value,
            active: true,
        }
    }
}

/// Serialize heartbeats as whole seconds.
mod heartbeat_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(d)?))
    }
}

/// Default metadata for the built-in Brazilian macro rates.
///
/// Heartbeats and circuit-breaker bounds follow the BCB publication cadence:
/// daily interest rates get a 2-day heartbeat, monthly inflation indices 35
/// days.
pub fn builtin_rate_metadata() -> Vec<(&'static str, RateMetadata)> {
    vec![
        (
            RATE_IPCA,
            RateMetadata::new(
                "IPCA",
                "IPCA - Brazilian Consumer Price Index (Monthly YoY %)",
                Duration::days(35),
                -10 * RATE_PRECISION,
                100 * RATE_PRECISION,
            ),
        ),
        (
            RATE_CDI,
            RateMetadata::new(
                "CDI",
                "CDI - Interbank Deposit Rate (Annualized %)",
                Duration::days(2),
                0,
                50 * RATE_PRECISION,
            ),
        ),
        (
            RATE_SELIC,
            RateMetadata::new(
                "SELIC",
                "SELIC - Central Bank Target Rate (%)",
                Duration::days(2),
                0,
                50 * RATE_PRECISION,
            ),
        ),
        (
            RATE_PTAX,
            RateMetadata::new(
                "PTAX",
                "PTAX - Official USD/BRL Exchange Rate",
                Duration::days(2),
                RATE_PRECISION,
                15 * RATE_PRECISION,
            ),
        ),
        (
            RATE_IGPM,
            RateMetadata::new(
                "IGPM",
                "IGP-M - General Market Price Index (Monthly %)",
                Duration::days(35),
                -10 * RATE_PRECISION,
                100 * RATE_PRECISION,
            ),
        ),
        (
            RATE_TR,
            RateMetadata::new(
                "TR",
                "TR - Reference Rate (%)",
                Duration::days(2),
                0,
                50 * RATE_PRECISION,
            ),
        ),
    ]
}

// =============================================================================
// Rate Update
// =============================================================================

/// One feed-publisher submission, used for both single and batch updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateUpdate {
    pub rate_type: String,
    pub value: i64,
    pub reference_date: u32,
    pub source: String,
}

impl RateUpdate {
    pub fn new(rate_type: impl Into<String>, value: i64, reference_date: u32, source: impl Into<String>) -> Self {
        Self {
            rate_type: rate_type.into(),
            value,
            reference_date,
            source: source.into(),
        }
    }
}

/// Checks that a YYYYMMDD integer is a plausible calendar date.
///
/// Year must fall in [1900, 2999], month in [1, 12] and day in [1, 31]. This
/// intentionally accepts a few impossible dates (e.g., February 31) - the
/// check guards against transposed or truncated integers, not against
/// calendar arithmetic.
pub fn is_plausible_reference_date(date: u32) -> bool {
    let year = date / 10_000;
    let month = (date / 100) % 100;
    let day = date % 100;
    (1900..=2999).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_reference_dates() {
        assert!(is_plausible_reference_date(20241126));
        assert!(is_plausible_reference_date(19000101));
        assert!(is_plausible_reference_date(29991231));
        // Tolerated: the check is shape-only.
        assert!(is_plausible_reference_date(20240231));
    }

    #[test]
    fn implausible_reference_dates() {
        assert!(!is_plausible_reference_date(0));
        assert!(!is_plausible_reference_date(18991231));
        assert!(!is_plausible_reference_date(30000101));
        assert!(!is_plausible_reference_date(20241301));
        assert!(!is_plausible_reference_date(20241100));
        assert!(!is_plausible_reference_date(20241132));
    }

    #[test]
    fn builtin_metadata_covers_all_rates() {
        let metadata = builtin_rate_metadata();
        let ids: Vec<&str> = metadata.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![RATE_IPCA, RATE_CDI, RATE_SELIC, RATE_PTAX, RATE_IGPM, RATE_TR]);
        for (_, meta) in metadata {
            assert!(meta.active);
            assert!(meta.min_value <= meta.max_value);
            assert_eq!(meta.decimal_places, RATE_DECIMALS);
        }
    }

    #[test]
    fn reading_value_as_decimal() {
        let reading = RateReading {
            rate_type: RATE_CDI.to_string(),
            value: 1_090_000_000,
            observed_at: Utc::now(),
            reference_date: 20241126,
            source: "BCB-12".to_string(),
            submitted_by: "publisher".to_string(),
            round: 1,
        };
        assert_eq!(reading.value_as_decimal().to_string(), "10.90000000");
    }
}
