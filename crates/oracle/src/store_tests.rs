//! Tests for the in-memory rate oracle contract.
//!
//! # Critical Contract Points
//!
//! 1. Single updates fail atomically, surfacing the first violated check in
//!    a fixed order
//! 2. Duplicate reference dates are rejected idempotently and never grow
//!    history
//! 3. Circuit-breaker bounds are inclusive on both ends
//! 4. Batch updates skip bad entries and report the applied count
//! 5. Deactivation stops acceptance but preserves the last known reading

#[cfg(test)]
mod tests {
    use crate::errors::OracleError;
    use crate::events::{MockOracleEventSink, OracleEvent};
    use crate::model::{RateMetadata, RateUpdate, RATE_CDI, RATE_IPCA, RATE_PRECISION};
    use crate::store::{InMemoryRateOracle, RateOracle};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn now() -> chrono::DateTime<chrono::Utc> {
        Utc.with_ymd_and_hms(2024, 11, 26, 12, 0, 0).unwrap()
    }

    fn cdi_update(value: i64, reference_date: u32) -> RateUpdate {
        RateUpdate::new(RATE_CDI, value, reference_date, "BCB-12")
    }

    #[tokio::test]
    async fn update_and_read_current() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await
            .unwrap();

        let reading = oracle.current(RATE_CDI).unwrap();
        assert_eq!(reading.value, 1_090_000_000);
        assert_eq!(reading.reference_date, 20241126);
        assert_eq!(reading.round, 1);
        assert_eq!(reading.source, "BCB-12");
        assert_eq!(reading.submitted_by, "publisher");
    }

    #[tokio::test]
    async fn round_advances_and_history_is_most_recent_first() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        for (i, date) in [20241125, 20241126, 20241127].iter().enumerate() {
            oracle
                .update_rate(
                    cdi_update(1_000_000_000 + i as i64, *date),
                    "publisher",
                    now() + Duration::days(i as i64),
                )
                .await
                .unwrap();
        }

        let current = oracle.current(RATE_CDI).unwrap();
        assert_eq!(current.round, 3);

        let history = oracle.history(RATE_CDI, 0).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].reference_date, 20241127);
        assert_eq!(history[1].reference_date, 20241126);
        assert_eq!(history[2].reference_date, 20241125);

        let limited = oracle.history(RATE_CDI, 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].reference_date, 20241127);
    }

    #[tokio::test]
    async fn duplicate_reference_date_rejected_without_growing_history() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await
            .unwrap();
        let before = oracle.history(RATE_CDI, 0).unwrap().len();

        let err = oracle
            .update_rate(cdi_update(1_100_000_000, 20241126), "publisher", now())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OracleError::DuplicateReferenceDate {
                rate_type: RATE_CDI.to_string(),
                reference_date: 20241126,
            }
        );

        assert_eq!(oracle.history(RATE_CDI, 0).unwrap().len(), before);
        assert_eq!(oracle.current(RATE_CDI).unwrap().value, 1_090_000_000);
    }

    #[tokio::test]
    async fn circuit_breaker_bounds_are_inclusive() {
        let oracle = InMemoryRateOracle::with_builtin_rates();

        // CDI bounds are [0, 50 * 10^8]. Exactly 50% passes.
        oracle
            .update_rate(cdi_update(50 * RATE_PRECISION, 20241126), "publisher", now())
            .await
            .unwrap();

        let err = oracle
            .update_rate(
                cdi_update(50 * RATE_PRECISION + 1, 20241127),
                "publisher",
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::ValueAboveMaximum { .. }));

        let err = oracle
            .update_rate(cdi_update(-1, 20241128), "publisher", now())
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::ValueBelowMinimum { .. }));
    }

    #[tokio::test]
    async fn check_order_is_deterministic() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await
            .unwrap();

        // Unknown type wins over everything else.
        let err = oracle
            .update_rate(
                RateUpdate::new("NOPE", -1, 99999999, "x"),
                "publisher",
                now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, OracleError::UnknownRateType("NOPE".to_string()));

        // Inactive wins over a malformed date.
        oracle.deactivate(RATE_CDI).await.unwrap();
        let err = oracle
            .update_rate(cdi_update(1_090_000_000, 99999999), "publisher", now())
            .await
            .unwrap_err();
        assert_eq!(err, OracleError::RateInactive(RATE_CDI.to_string()));
        oracle.reactivate(RATE_CDI).await.unwrap();

        // Malformed date wins over the duplicate-date check.
        let err = oracle
            .update_rate(cdi_update(1_090_000_000, 99999999), "publisher", now())
            .await
            .unwrap_err();
        assert_eq!(err, OracleError::InvalidReferenceDate(99999999));

        // Duplicate date wins over the circuit breaker.
        let err = oracle
            .update_rate(cdi_update(999 * RATE_PRECISION, 20241126), "publisher", now())
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::DuplicateReferenceDate { .. }));
    }

    #[tokio::test]
    async fn batch_skips_bad_entries_and_counts_applied() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        oracle
            .update_rate(cdi_update(1_090_000_000, 20241125), "publisher", now())
            .await
            .unwrap();

        let updates = vec![
            // Applies: new date, in bounds.
            cdi_update(1_095_000_000, 20241126),
            // Skipped: duplicate of the entry just applied above.
            cdi_update(1_095_000_000, 20241126),
            // Skipped: unknown rate type.
            RateUpdate::new("UNKNOWN", 1, 20241126, "x"),
            // Skipped: above CDI maximum.
            cdi_update(60 * RATE_PRECISION, 20241127),
            // Applies.
            RateUpdate::new(RATE_IPCA, 450_000_000, 20241101, "BCB-433"),
        ];

        let applied = oracle
            .batch_update_rates(&updates, "publisher", now())
            .await
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(oracle.current(RATE_CDI).unwrap().value, 1_095_000_000);
        assert_eq!(oracle.current(RATE_IPCA).unwrap().value, 450_000_000);
    }

    #[tokio::test]
    async fn add_rate_type_validation() {
        let oracle = InMemoryRateOracle::with_builtin_rates();

        let err = oracle
            .add_rate_type("  ", RateMetadata::new("X", "X", Duration::days(1), 0, 1))
            .await
            .unwrap_err();
        assert_eq!(err, OracleError::EmptyIdentifier);

        let err = oracle
            .add_rate_type(RATE_CDI, RateMetadata::new("X", "X", Duration::days(1), 0, 1))
            .await
            .unwrap_err();
        assert_eq!(err, OracleError::DuplicateRateType(RATE_CDI.to_string()));

        oracle
            .add_rate_type(
                "INCC",
                RateMetadata::new("INCC", "Construction cost index", Duration::days(35), 0, 1_000 * RATE_PRECISION),
            )
            .await
            .unwrap();
        assert!(oracle.rate_types().contains(&"INCC".to_string()));
    }

    #[tokio::test]
    async fn staleness_against_supplied_now() {
        let oracle = InMemoryRateOracle::with_builtin_rates();

        // No reading yet: stale by definition.
        assert!(oracle.is_stale(RATE_CDI, now()).unwrap());

        oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await
            .unwrap();
        assert!(!oracle.is_stale(RATE_CDI, now() + Duration::days(1)).unwrap());
        // CDI heartbeat is 2 days.
        assert!(oracle.is_stale(RATE_CDI, now() + Duration::days(3)).unwrap());

        assert!(oracle.is_stale("NOPE", now()).is_err());
    }

    #[tokio::test]
    async fn deactivation_preserves_current_reading() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await
            .unwrap();

        oracle.deactivate(RATE_CDI).await.unwrap();
        let err = oracle
            .update_rate(cdi_update(1_100_000_000, 20241127), "publisher", now())
            .await
            .unwrap_err();
        assert_eq!(err, OracleError::RateInactive(RATE_CDI.to_string()));

        // Last known value stays visible to readers.
        assert_eq!(oracle.current(RATE_CDI).unwrap().value, 1_090_000_000);
        assert_eq!(oracle.history(RATE_CDI, 0).unwrap().len(), 1);

        oracle.reactivate(RATE_CDI).await.unwrap();
        oracle
            .update_rate(cdi_update(1_100_000_000, 20241127), "publisher", now())
            .await
            .unwrap();
        assert_eq!(oracle.current(RATE_CDI).unwrap().value, 1_100_000_000);
    }

    #[tokio::test]
    async fn bounds_update_applies_to_future_updates_only() {
        let oracle = InMemoryRateOracle::with_builtin_rates();
        oracle
            .update_rate(cdi_update(20 * RATE_PRECISION, 20241126), "publisher", now())
            .await
            .unwrap();

        oracle
            .set_bounds(RATE_CDI, 0, 10 * RATE_PRECISION)
            .await
            .unwrap();

        // History keeps the now-out-of-range point.
        assert_eq!(oracle.current(RATE_CDI).unwrap().value, 20 * RATE_PRECISION);

        let err = oracle
            .update_rate(cdi_update(15 * RATE_PRECISION, 20241127), "publisher", now())
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::ValueAboveMaximum { .. }));

        let err = oracle.set_bounds(RATE_CDI, 10, 5).await.unwrap_err();
        assert!(matches!(err, OracleError::InvalidBounds { .. }));
    }

    #[tokio::test]
    async fn update_event_emitted_on_success_only() {
        let sink = Arc::new(MockOracleEventSink::new());
        let oracle = InMemoryRateOracle::with_builtin_rates().with_event_sink(sink.clone());

        oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await
            .unwrap();
        let _ = oracle
            .update_rate(cdi_update(1_090_000_000, 20241126), "publisher", now())
            .await;

        let updates: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, OracleEvent::RateUpdated { .. }))
            .collect();
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn spike_anomaly_recorded_but_update_accepted() {
        let oracle = InMemoryRateOracle::with_builtin_rates();

        // Six quiet dailies around 10.90%, then a jump to 20%.
        for (i, date) in [20241118, 20241119, 20241120, 20241121, 20241122, 20241125]
            .iter()
            .enumerate()
        {
            oracle
                .update_rate(
                    cdi_update(1_090_000_000 + i as i64 * 100_000, *date),
                    "publisher",
                    now() - Duration::days(6 - i as i64),
                )
                .await
                .unwrap();
        }
        oracle
            .update_rate(cdi_update(20 * RATE_PRECISION, 20241126), "publisher", now())
            .await
            .unwrap();

        // The update went through; the anomaly is monitoring only.
        assert_eq!(oracle.current(RATE_CDI).unwrap().value, 20 * RATE_PRECISION);
        let anomalies = oracle.anomalies(Some(RATE_CDI), 0);
        assert!(!anomalies.is_empty());
    }
}
