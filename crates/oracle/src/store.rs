//! Rate oracle store.
//!
//! [`RateOracle`] is the contract consumed by the debenture engine and fed by
//! the external feed publisher. [`InMemoryRateOracle`] is the reference
//! implementation; persistent backends implement the same trait over their
//! own storage.
//!
//! # Design Notes
//!
//! - Mutations are async so backends with real I/O fit the same seam; reads
//!   are sync and operate on copy-on-read data.
//! - Single updates fail atomically on the first violated check, in a fixed
//!   order (unknown type, inactive, reference date shape, duplicate date,
//!   bounds). Batch updates skip failing entries and report the applied count.
//! - History is append-only, returned most-recent-first, never compacted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::anomaly::{AnomalyDetector, AnomalyRecord};
use crate::errors::{OracleError, Result};
use crate::events::{NoOpOracleEventSink, OracleEvent, OracleEventSink};
use crate::model::{
    builtin_rate_metadata, is_plausible_reference_date, RateMetadata, RateReading, RateUpdate,
};

// =============================================================================
// Rate Oracle Trait
// =============================================================================

/// Contract for the validated, versioned macro-rate time series.
#[async_trait]
pub trait RateOracle: Send + Sync {
    // =========================================================================
    // Mutations
    // =========================================================================

    /// Registers a new rate type.
    ///
    /// Fails with `DuplicateRateType` if the identifier is taken and
    /// `EmptyIdentifier` if it is blank.
    async fn add_rate_type(&self, id: &str, metadata: RateMetadata) -> Result<()>;

    /// Accepts a single reading, archiving the superseded one.
    ///
    /// All checks run before any state change; the first violated check is
    /// surfaced. On success the per-rate round counter advances and a
    /// `RateUpdated` event is emitted.
    async fn update_rate(
        &self,
        update: RateUpdate,
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Best-effort batch update.
    ///
    /// Entries failing any single-update check are skipped silently so one
    /// bad entry never blocks the rest of the feed. Returns the number of
    /// entries actually applied.
    async fn batch_update_rates(
        &self,
        updates: &[RateUpdate],
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// Replaces the circuit-breaker bounds for a rate type.
    ///
    /// Applies to future updates only; accepted history is never revisited.
    async fn set_bounds(&self, id: &str, min_value: i64, max_value: i64) -> Result<()>;

    /// Stops acceptance of updates. The current reading and history remain
    /// visible; staleness will flag the data once the heartbeat elapses.
    async fn deactivate(&self, id: &str) -> Result<()>;

    /// Resumes acceptance of updates.
    async fn reactivate(&self, id: &str) -> Result<()>;

    // =========================================================================
    // Queries
    // =========================================================================

    /// The current reading for a rate type.
    fn current(&self, id: &str) -> Result<RateReading>;

    /// Readings most-recent-first, current included. `count` of 0 means
    /// unlimited.
    fn history(&self, id: &str, count: usize) -> Result<Vec<RateReading>>;

    /// The metadata for a rate type.
    fn metadata(&self, id: &str) -> Result<RateMetadata>;

    /// True when no reading exists or the current one is older than the
    /// heartbeat.
    fn is_stale(&self, id: &str, now: DateTime<Utc>) -> Result<bool>;

    /// All registered rate type identifiers.
    fn rate_types(&self) -> Vec<String>;

    /// Recorded anomalies, most-recent-first, optionally filtered by rate
    /// type. `limit` of 0 means unlimited.
    fn anomalies(&self, rate_type: Option<&str>, limit: usize) -> Vec<AnomalyRecord>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// Full time series for one rate type.
#[derive(Debug, Clone)]
struct RateSeries {
    metadata: RateMetadata,
    current: Option<RateReading>,
    /// Archived readings, oldest-first internally.
    archived: Vec<RateReading>,
    round: u64,
}

impl RateSeries {
    fn new(metadata: RateMetadata) -> Self {
        Self {
            metadata,
            current: None,
            archived: Vec::new(),
            round: 0,
        }
    }
}

/// In-memory [`RateOracle`] implementation.
#[derive(Clone)]
pub struct InMemoryRateOracle {
    series: Arc<RwLock<HashMap<String, RateSeries>>>,
    anomalies: Arc<RwLock<Vec<AnomalyRecord>>>,
    detector: AnomalyDetector,
    event_sink: Arc<dyn OracleEventSink>,
}

impl InMemoryRateOracle {
    /// Creates an empty oracle with no registered rate types.
    pub fn new() -> Self {
        Self {
            series: Arc::new(RwLock::new(HashMap::new())),
            anomalies: Arc::new(RwLock::new(Vec::new())),
            detector: AnomalyDetector::default(),
            event_sink: Arc::new(NoOpOracleEventSink),
        }
    }

    /// Creates an oracle pre-registered with the six built-in Brazilian macro
    /// rates (IPCA, CDI, SELIC, PTAX, IGPM, TR).
    pub fn with_builtin_rates() -> Self {
        let oracle = Self::new();
        {
            let mut series = oracle.series.write().unwrap();
            for (id, metadata) in builtin_rate_metadata() {
                series.insert(id.to_string(), RateSeries::new(metadata));
            }
        }
        oracle
    }

    /// Sets the event sink for this oracle.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn OracleEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Overrides the anomaly detector configuration.
    pub fn with_detector(mut self, detector: AnomalyDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Runs every single-update check against one entry and, when all pass,
    /// installs the reading. Runs entirely under the write lock so the check
    /// and the install are atomic.
    fn apply_update(
        series: &mut HashMap<String, RateSeries>,
        update: &RateUpdate,
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> Result<RateReading> {
        let entry = series
            .get_mut(&update.rate_type)
            .ok_or_else(|| OracleError::UnknownRateType(update.rate_type.clone()))?;

        if !entry.metadata.active {
            return Err(OracleError::RateInactive(update.rate_type.clone()));
        }
        if !is_plausible_reference_date(update.reference_date) {
            return Err(OracleError::InvalidReferenceDate(update.reference_date));
        }
        if let Some(current) = &entry.current {
            if current.reference_date == update.reference_date {
                return Err(OracleError::DuplicateReferenceDate {
                    rate_type: update.rate_type.clone(),
                    reference_date: update.reference_date,
                });
            }
        }
        if update.value < entry.metadata.min_value {
            return Err(OracleError::ValueBelowMinimum {
                rate_type: update.rate_type.clone(),
                value: update.value,
                min: entry.metadata.min_value,
            });
        }
        if update.value > entry.metadata.max_value {
            return Err(OracleError::ValueAboveMaximum {
                rate_type: update.rate_type.clone(),
                value: update.value,
                max: entry.metadata.max_value,
            });
        }

        entry.round += 1;
        let reading = RateReading {
            rate_type: update.rate_type.clone(),
            value: update.value,
            observed_at: now,
            reference_date: update.reference_date,
            source: update.source.clone(),
            submitted_by: submitted_by.to_string(),
            round: entry.round,
        };
        if let Some(previous) = entry.current.replace(reading.clone()) {
            entry.archived.push(previous);
        }
        Ok(reading)
    }

    /// Monitoring-only anomaly pass over an accepted reading.
    fn check_anomalies(&self, reading: &RateReading, previous: Option<&RateReading>, now: DateTime<Utc>) {
        let mut checks = Vec::new();

        let history: Vec<_> = {
            let series = self.series.read().unwrap();
            series
                .get(&reading.rate_type)
                .map(|s| s.archived.iter().map(|r| r.value_as_decimal()).collect())
                .unwrap_or_default()
        };
        if let Some(check) = self
            .detector
            .detect_value_spike(reading.value_as_decimal(), &history)
        {
            checks.push(check);
        }

        if let Some(prev) = previous {
            let heartbeat = {
                let series = self.series.read().unwrap();
                series.get(&reading.rate_type).map(|s| s.metadata.heartbeat)
            };
            if let Some(heartbeat) = heartbeat {
                if let Some(check) = self.detector.detect_stale(prev.observed_at, heartbeat, now) {
                    checks.push(check);
                }
            }
            if let Some(check) = self.detector.detect_velocity(
                reading.value_as_decimal(),
                prev.value_as_decimal(),
                now - prev.observed_at,
            ) {
                checks.push(check);
            }
        }

        if checks.is_empty() {
            return;
        }
        let mut log = self.anomalies.write().unwrap();
        for check in checks {
            warn!(
                "Anomaly on {}: {:?} - {}",
                reading.rate_type,
                check.kind,
                check.message
            );
            let severity = check.severity();
            log.push(AnomalyRecord {
                rate_type: reading.rate_type.clone(),
                detected_at: now,
                check,
                severity,
            });
        }
    }
}

impl Default for InMemoryRateOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateOracle for InMemoryRateOracle {
    async fn add_rate_type(&self, id: &str, metadata: RateMetadata) -> Result<()> {
        if id.trim().is_empty() {
            return Err(OracleError::EmptyIdentifier);
        }
        let mut series = self.series.write().unwrap();
        if series.contains_key(id) {
            return Err(OracleError::DuplicateRateType(id.to_string()));
        }
        series.insert(id.to_string(), RateSeries::new(metadata));
        drop(series);

        info!("Registered rate type {}", id);
        self.event_sink.emit(OracleEvent::RateTypeAdded {
            rate_type: id.to_string(),
        });
        Ok(())
    }

    async fn update_rate(
        &self,
        update: RateUpdate,
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (reading, previous) = {
            let mut series = self.series.write().unwrap();
            let previous = series
                .get(&update.rate_type)
                .and_then(|s| s.current.clone());
            let reading = Self::apply_update(&mut series, &update, submitted_by, now)?;
            (reading, previous)
        };

        info!(
            "Rate {} updated to {} for reference date {} (round {})",
            reading.rate_type, reading.value, reading.reference_date, reading.round
        );
        self.check_anomalies(&reading, previous.as_ref(), now);
        self.event_sink.emit(OracleEvent::RateUpdated { reading });
        Ok(())
    }

    async fn batch_update_rates(
        &self,
        updates: &[RateUpdate],
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut applied = Vec::new();
        {
            let mut series = self.series.write().unwrap();
            for update in updates {
                let previous = series
                    .get(&update.rate_type)
                    .and_then(|s| s.current.clone());
                match Self::apply_update(&mut series, update, submitted_by, now) {
                    Ok(reading) => applied.push((reading, previous)),
                    Err(err) => {
                        debug!("Batch entry for {} skipped: {}", update.rate_type, err);
                    }
                }
            }
        }

        info!(
            "Batch update applied {} of {} entries",
            applied.len(),
            updates.len()
        );
        let count = applied.len();
        for (reading, previous) in applied {
            self.check_anomalies(&reading, previous.as_ref(), now);
            self.event_sink.emit(OracleEvent::RateUpdated { reading });
        }
        Ok(count)
    }

    async fn set_bounds(&self, id: &str, min_value: i64, max_value: i64) -> Result<()> {
        if min_value > max_value {
            return Err(OracleError::InvalidBounds {
                rate_type: id.to_string(),
                min: min_value,
                max: max_value,
            });
        }
        {
            let mut series = self.series.write().unwrap();
            let entry = series
                .get_mut(id)
                .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))?;
            entry.metadata.min_value = min_value;
            entry.metadata.max_value = max_value;
        }
        info!("Bounds for {} set to [{}, {}]", id, min_value, max_value);
        self.event_sink.emit(OracleEvent::BoundsChanged {
            rate_type: id.to_string(),
            min_value,
            max_value,
        });
        Ok(())
    }

    async fn deactivate(&self, id: &str) -> Result<()> {
        {
            let mut series = self.series.write().unwrap();
            let entry = series
                .get_mut(id)
                .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))?;
            entry.metadata.active = false;
        }
        info!("Rate type {} deactivated", id);
        self.event_sink.emit(OracleEvent::RateActivationChanged {
            rate_type: id.to_string(),
            active: false,
        });
        Ok(())
    }

    async fn reactivate(&self, id: &str) -> Result<()> {
        {
            let mut series = self.series.write().unwrap();
            let entry = series
                .get_mut(id)
                .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))?;
            entry.metadata.active = true;
        }
        info!("Rate type {} reactivated", id);
        self.event_sink.emit(OracleEvent::RateActivationChanged {
            rate_type: id.to_string(),
            active: true,
        });
        Ok(())
    }

    fn current(&self, id: &str) -> Result<RateReading> {
        let series = self.series.read().unwrap();
        let entry = series
            .get(id)
            .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))?;
        entry
            .current
            .clone()
            .ok_or_else(|| OracleError::NoData(id.to_string()))
    }

    fn history(&self, id: &str, count: usize) -> Result<Vec<RateReading>> {
        let series = self.series.read().unwrap();
        let entry = series
            .get(id)
            .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))?;

        let mut readings: Vec<RateReading> = entry
            .current
            .iter()
            .chain(entry.archived.iter().rev())
            .cloned()
            .collect();
        if count > 0 {
            readings.truncate(count);
        }
        Ok(readings)
    }

    fn metadata(&self, id: &str) -> Result<RateMetadata> {
        let series = self.series.read().unwrap();
        series
            .get(id)
            .map(|s| s.metadata.clone())
            .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))
    }

    fn is_stale(&self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let series = self.series.read().unwrap();
        let entry = series
            .get(id)
            .ok_or_else(|| OracleError::UnknownRateType(id.to_string()))?;
        Ok(match &entry.current {
            None => true,
            Some(current) => now - current.observed_at > entry.metadata.heartbeat,
        })
    }

    fn rate_types(&self) -> Vec<String> {
        let series = self.series.read().unwrap();
        let mut ids: Vec<String> = series.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn anomalies(&self, rate_type: Option<&str>, limit: usize) -> Vec<AnomalyRecord> {
        let log = self.anomalies.read().unwrap();
        let mut records: Vec<AnomalyRecord> = log
            .iter()
            .rev()
            .filter(|r| rate_type.map_or(true, |t| r.rate_type == t))
            .cloned()
            .collect();
        if limit > 0 {
            records.truncate(limit);
        }
        records
    }
}
