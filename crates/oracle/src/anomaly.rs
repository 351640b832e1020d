//! Statistical anomaly detection for rate updates.
//!
//! Three checks: value spikes (z-score against the historical mean), stale
//! data (age beyond the heartbeat), and velocity (rate of change per day).
//! Anomalies are logged and recorded but never block an update - the circuit
//! breaker bounds in [`RateMetadata`](crate::model::RateMetadata) are the only
//! hard gate.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Classification of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ValueSpike,
    StaleData,
    Velocity,
}

/// Severity derived from how far outside the expected range the value falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// Result of a single anomaly check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyCheck {
    pub kind: AnomalyKind,
    pub current_value: Decimal,
    pub mean: Decimal,
    pub std_dev: Decimal,
    pub z_score: Decimal,
    pub message: String,
}

impl AnomalyCheck {
    pub fn severity(&self) -> Severity {
        if self.z_score > Decimal::from(5) {
            Severity::Critical
        } else if self.z_score > Decimal::from(4) {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

/// A recorded anomaly, attributed to a rate type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub rate_type: String,
    pub detected_at: DateTime<Utc>,
    pub check: AnomalyCheck,
    pub severity: Severity,
}

/// Statistical anomaly detector.
///
/// Thresholds follow the feed backend defaults: 3 standard deviations for
/// value spikes, 50% change per day for velocity, and at least 5 historical
/// points before the statistics are considered meaningful.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    pub std_threshold: Decimal,
    pub velocity_threshold: Decimal,
    pub min_history: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            std_threshold: Decimal::from(3),
            velocity_threshold: Decimal::new(5, 1), // 0.5
            min_history: 5,
        }
    }
}

impl AnomalyDetector {
    /// Flags a candidate value more than `std_threshold` standard deviations
    /// from the historical mean.
    ///
    /// Returns `None` when history is too short for meaningful statistics.
    /// When every historical value is identical, any differing candidate is
    /// flagged with a sentinel z-score of 999.
    pub fn detect_value_spike(&self, current: Decimal, history: &[Decimal]) -> Option<AnomalyCheck> {
        if history.len() < self.min_history {
            return None;
        }

        let n = Decimal::from(history.len());
        let mean = history.iter().sum::<Decimal>() / n;
        let variance = history
            .iter()
            .map(|v| (*v - mean) * (*v - mean))
            .sum::<Decimal>()
            / Decimal::from(history.len() - 1);
        let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

        if std_dev.is_zero() {
            if current == mean {
                return None;
            }
            return Some(AnomalyCheck {
                kind: AnomalyKind::ValueSpike,
                current_value: current,
                mean,
                std_dev,
                z_score: Decimal::from(999),
                message: format!("Value {} differs from constant history {}", current, mean),
            });
        }

        let z_score = ((current - mean) / std_dev).abs();
        if z_score <= self.std_threshold {
            return None;
        }

        let direction = if current > mean { "above" } else { "below" };
        Some(AnomalyCheck {
            kind: AnomalyKind::ValueSpike,
            current_value: current,
            mean,
            std_dev,
            z_score,
            message: format!(
                "Value {} is {} std devs {} mean {} (threshold {})",
                current,
                z_score.round_dp(2),
                direction,
                mean.round_dp(4),
                self.std_threshold
            ),
        })
    }

    /// Flags data older than the configured heartbeat.
    pub fn detect_stale(
        &self,
        last_update: DateTime<Utc>,
        heartbeat: Duration,
        now: DateTime<Utc>,
    ) -> Option<AnomalyCheck> {
        let age = now - last_update;
        if age <= heartbeat || heartbeat.num_seconds() <= 0 {
            return None;
        }

        let age_seconds = Decimal::from(age.num_seconds());
        let heartbeat_seconds = Decimal::from(heartbeat.num_seconds());
        let ratio = age_seconds / heartbeat_seconds;
        Some(AnomalyCheck {
            kind: AnomalyKind::StaleData,
            current_value: age_seconds,
            mean: heartbeat_seconds,
            std_dev: Decimal::ZERO,
            z_score: ratio,
            message: format!(
                "Data age {}h exceeds heartbeat {}h ({}x)",
                (age_seconds / Decimal::from(3600)).round_dp(1),
                (heartbeat_seconds / Decimal::from(3600)).round_dp(1),
                ratio.round_dp(1)
            ),
        })
    }

    /// Flags an abnormal rate of change between consecutive readings.
    ///
    /// The fractional change is normalized to a 24-hour window before being
    /// compared against `velocity_threshold`.
    pub fn detect_velocity(
        &self,
        current: Decimal,
        previous: Decimal,
        elapsed: Duration,
    ) -> Option<AnomalyCheck> {
        if previous.is_zero() {
            return None;
        }
        let hours = Decimal::from(elapsed.num_seconds().max(1)) / Decimal::from(3600);
        let change = ((current - previous) / previous).abs();
        let daily_change = change * Decimal::from(24) / hours;
        if daily_change <= self.velocity_threshold {
            return None;
        }

        Some(AnomalyCheck {
            kind: AnomalyKind::Velocity,
            current_value: current,
            mean: previous,
            std_dev: Decimal::ZERO,
            z_score: daily_change,
            message: format!(
                "Change of {}% per day from {} to {} exceeds threshold {}%",
                (daily_change * Decimal::from(100)).round_dp(1),
                previous,
                current,
                self.velocity_threshold * Decimal::from(100)
            ),
        })
    }
}
