//! Oracle event sink.
//!
//! The oracle emits an event after every accepted update. Hosts translate
//! these into their own notification mechanism (ledger event log, message
//! bus, UI refresh). Emission is best-effort and must never fail the update.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::model::RateReading;

/// Events emitted by the oracle after successful mutations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleEvent {
    /// A new reading was accepted for a rate type.
    RateUpdated { reading: RateReading },

    /// A rate type was registered.
    RateTypeAdded { rate_type: String },

    /// A rate type was deactivated or reactivated.
    RateActivationChanged { rate_type: String, active: bool },

    /// Circuit-breaker bounds were changed.
    BoundsChanged { rate_type: String, min_value: i64, max_value: i64 },
}

/// Trait for receiving oracle events.
///
/// `emit()` must be fast and non-blocking; failures must not affect the
/// update that produced the event.
pub trait OracleEventSink: Send + Sync {
    fn emit(&self, event: OracleEvent);
}

/// No-op implementation for tests or hosts that don't consume events.
#[derive(Clone, Default)]
pub struct NoOpOracleEventSink;

impl OracleEventSink for NoOpOracleEventSink {
    fn emit(&self, _event: OracleEvent) {}
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockOracleEventSink {
    events: Arc<Mutex<Vec<OracleEvent>>>,
}

impl MockOracleEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<OracleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl OracleEventSink for MockOracleEventSink {
    fn emit(&self, event: OracleEvent) {
        self.events.lock().unwrap().push(event);
    }
}
