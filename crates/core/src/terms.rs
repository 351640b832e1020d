//! Debenture terms model.
//!
//! [`DebentureTerms`] is the immutable-after-issuance value object describing
//! a series: face value, dates, rate link, coupon frequency, clauses, and the
//! claim/schedule policy variants selected at instance creation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accrual::DiMode;
use crate::errors::TermsError;
use lastro_oracle::{RATE_IGPM, RATE_IPCA};

// =============================================================================
// Rate Link
// =============================================================================

/// How coupon and principal values follow a reference rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateLink {
    /// Fixed rate (prefixada), annual basis points.
    Fixed { rate_bps: i64 },
    /// Percentage of DI, two decimal places (104.50% = 10_450).
    PercentDi { percent_2dp: i64 },
    /// 100% of DI plus an annual spread in basis points.
    DiSpread { spread_bps: i64 },
    /// IPCA indexation plus an annual spread in basis points.
    IpcaSpread { spread_bps: i64 },
    /// IGP-M indexation plus an annual spread in basis points.
    IgpmSpread { spread_bps: i64 },
}

impl RateLink {
    /// True for %DI and DI+spread debentures.
    pub fn is_di_linked(&self) -> bool {
        matches!(self, RateLink::PercentDi { .. } | RateLink::DiSpread { .. })
    }

    /// True for IPCA and IGP-M indexed debentures.
    pub fn is_index_linked(&self) -> bool {
        matches!(self, RateLink::IpcaSpread { .. } | RateLink::IgpmSpread { .. })
    }

    /// The oracle rate type backing the VNA indexation, when index-linked.
    pub fn index_rate_type(&self) -> Option<&'static str> {
        match self {
            RateLink::IpcaSpread { .. } => Some(RATE_IPCA),
            RateLink::IgpmSpread { .. } => Some(RATE_IGPM),
            _ => None,
        }
    }

    /// The DI participation mode, when DI-linked.
    pub fn di_mode(&self) -> Option<DiMode> {
        match self {
            RateLink::PercentDi { percent_2dp } => Some(DiMode::PercentDi {
                percent_2dp: *percent_2dp,
            }),
            RateLink::DiSpread { spread_bps } => Some(DiMode::Spread {
                spread_bps: *spread_bps,
            }),
            _ => None,
        }
    }

    /// The fixed rate or spread in basis points used for pro-rata accrual.
    pub fn rate_bps(&self) -> i64 {
        match self {
            RateLink::Fixed { rate_bps } => *rate_bps,
            RateLink::PercentDi { .. } => 0,
            RateLink::DiSpread { spread_bps }
            | RateLink::IpcaSpread { spread_bps }
            | RateLink::IgpmSpread { spread_bps } => *spread_bps,
        }
    }
}

// =============================================================================
// Policies
// =============================================================================

/// Per-holder claim bookkeeping variant, fixed at instance creation.
///
/// The two policies are observably different and deliberately kept separate
/// instead of merged: unordered claims track a per-index set; ordered claims
/// keep one monotonic cursor and refuse to skip an unpaid coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPolicy {
    Unordered,
    Ordered,
}

/// Amortization schedule mutation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    /// Entries may only be appended after the last existing date.
    AppendOnly,
    /// The whole schedule may be swapped before execution starts.
    Replaceable,
}

// =============================================================================
// Amortization
// =============================================================================

/// How one amortization entry's amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum AmortizationBasis {
    /// Percentage of the original face value, in basis points.
    PercentOfVne { bps: i64 },
    /// Percentage of the current updated face value, in basis points.
    PercentOfVna { bps: i64 },
    /// Fixed value per unit, 6 decimals.
    FixedValue { value: i128 },
}

impl AmortizationBasis {
    /// An amortization can only ever reduce the updated face value.
    pub fn is_negative(&self) -> bool {
        match self {
            AmortizationBasis::PercentOfVne { bps } | AmortizationBasis::PercentOfVna { bps } => {
                *bps < 0
            }
            AmortizationBasis::FixedValue { value } => *value < 0,
        }
    }
}

/// One scheduled amortization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationEntry {
    pub due_date: NaiveDate,
    pub basis: AmortizationBasis,
    pub executed: bool,
}

impl AmortizationEntry {
    pub fn new(due_date: NaiveDate, basis: AmortizationBasis) -> Self {
        Self {
            due_date,
            basis,
            executed: false,
        }
    }
}

// =============================================================================
// Debenture Terms
// =============================================================================

/// Immutable-after-issuance terms of one debenture series.
///
/// Repactuation is the single sanctioned exception: it replaces the rate
/// link and maturity through the lifecycle state machine when the clause is
/// enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebentureTerms {
    pub isin: String,
    pub series: String,
    /// Original face value per unit (VNE), 6 decimals.
    pub face_value: i128,
    pub unit_count: u64,
    pub issue_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub rate_link: RateLink,
    pub coupon_frequency_days: u32,
    pub repactuation_allowed: bool,
    pub early_redemption_allowed: bool,
    /// Transfers by non-issuer holders are restricted until this date.
    pub lock_up_end: Option<NaiveDate>,
    pub claim_policy: ClaimPolicy,
    pub schedule_policy: SchedulePolicy,
}

impl DebentureTerms {
    /// Shape validation, run once at issuance.
    pub fn validate(&self) -> Result<(), TermsError> {
        if self.isin.trim().is_empty() {
            return Err(TermsError::BlankIsin);
        }
        if self.face_value <= 0 {
            return Err(TermsError::NonPositiveFaceValue);
        }
        if self.unit_count == 0 {
            return Err(TermsError::NonPositiveUnits);
        }
        if self.maturity_date <= self.issue_date {
            return Err(TermsError::MaturityBeforeIssue {
                issue: self.issue_date,
                maturity: self.maturity_date,
            });
        }
        if self.coupon_frequency_days == 0 {
            return Err(TermsError::NonPositiveCouponFrequency);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PU_PRECISION;

    fn base_terms() -> DebentureTerms {
        DebentureTerms {
            isin: "BRACMEDBS001".to_string(),
            series: "1".to_string(),
            face_value: 1_000 * PU_PRECISION,
            unit_count: 1_000,
            issue_date: NaiveDate::from_ymd_opt(2024, 11, 26).unwrap(),
            maturity_date: NaiveDate::from_ymd_opt(2029, 11, 26).unwrap(),
            rate_link: RateLink::DiSpread { spread_bps: 50 },
            coupon_frequency_days: 180,
            repactuation_allowed: false,
            early_redemption_allowed: false,
            lock_up_end: None,
            claim_policy: ClaimPolicy::Unordered,
            schedule_policy: SchedulePolicy::AppendOnly,
        }
    }

    #[test]
    fn valid_terms_pass() {
        assert!(base_terms().validate().is_ok());
    }

    #[test]
    fn blank_isin_rejected() {
        let mut terms = base_terms();
        terms.isin = "   ".to_string();
        assert_eq!(terms.validate().unwrap_err(), TermsError::BlankIsin);
    }

    #[test]
    fn non_positive_face_value_rejected() {
        let mut terms = base_terms();
        terms.face_value = 0;
        assert_eq!(terms.validate().unwrap_err(), TermsError::NonPositiveFaceValue);
    }

    #[test]
    fn maturity_must_follow_issue() {
        let mut terms = base_terms();
        terms.maturity_date = terms.issue_date;
        assert!(matches!(
            terms.validate().unwrap_err(),
            TermsError::MaturityBeforeIssue { .. }
        ));
    }

    #[test]
    fn rate_link_classification() {
        assert!(RateLink::PercentDi { percent_2dp: 10_450 }.is_di_linked());
        assert!(RateLink::DiSpread { spread_bps: 50 }.is_di_linked());
        assert!(!RateLink::Fixed { rate_bps: 1_200 }.is_di_linked());

        assert!(RateLink::IpcaSpread { spread_bps: 620 }.is_index_linked());
        assert_eq!(
            RateLink::IpcaSpread { spread_bps: 620 }.index_rate_type(),
            Some(lastro_oracle::RATE_IPCA)
        );
        assert_eq!(RateLink::Fixed { rate_bps: 1_200 }.index_rate_type(), None);
    }
}
