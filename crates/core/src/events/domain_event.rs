//! Domain event types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::DebentureStatus;

/// Domain events emitted by the debenture engine after successful mutations.
///
/// These events represent facts about completed state changes. External
/// indexing services (ISIN registries, issuer dashboards) observe them
/// instead of polling the aggregates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// The updated face value moved after an index update.
    VnaUpdated {
        debenture_id: Uuid,
        old_value: i128,
        new_value: i128,
    },

    /// The DI accumulation factor advanced by one daily update.
    DiFactorUpdated { debenture_id: Uuid, factor: i128 },

    /// A coupon was calculated and recorded.
    CouponRecorded {
        debenture_id: Uuid,
        index: usize,
        coupon_amount_per_unit: i128,
        amort_amount_per_unit: i128,
    },

    /// The issuer funded a recorded coupon.
    CouponPaid {
        debenture_id: Uuid,
        index: usize,
        total_amount: i128,
    },

    /// A holder claimed their share of a paid coupon.
    CouponClaimed {
        debenture_id: Uuid,
        index: usize,
        holder: String,
        amount: i128,
    },

    /// An amortization entry was executed and VNA decremented.
    AmortizationExecuted {
        debenture_id: Uuid,
        index: usize,
        amount_per_unit: i128,
        new_vna: i128,
    },

    /// The amortization schedule changed (append or replacement).
    ScheduleChanged { debenture_id: Uuid },

    /// The debenture status moved.
    StatusChanged {
        debenture_id: Uuid,
        old_status: DebentureStatus,
        new_status: DebentureStatus,
    },
}
