//! Valuation engine.
//!
//! Owns the two pieces of accrual state a debenture carries between lifecycle
//! events: the [`VnaRecord`] (updated face value driven by IPCA/IGPM index
//! readings) and the [`DiAccrual`] (running DI factor, reset at each coupon
//! record). PU-PAR and coupon previews are derived from them on demand.
//!
//! All operations take an explicit `now`; the engine holds no clock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accrual::{accumulate, business_days_since, di_daily_factor, index_ratio};
use crate::constants::{
    BPS_DENOMINATOR, BUSINESS_DAYS_PER_YEAR, FACTOR_PRECISION, VNA_FACTOR_PRECISION,
};
use crate::errors::ValuationError;
use crate::fixed::mul_div;
use crate::terms::DebentureTerms;
use lastro_oracle::RateOracle;

/// 8-decimal percent units per basis point (1 bps = 0.01% = 10^6 at 8 dec).
const RATE_UNITS_PER_BPS: i64 = 1_000_000;

// =============================================================================
// State
// =============================================================================

/// Updated face value (VNA) state.
///
/// Starts equal to VNE with an accumulation factor of exactly 1.0 (1e8).
/// Mutated only by [`Valuation::update_vna`] and amortization decrements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnaRecord {
    /// Current updated face value per unit, 6 decimals.
    pub value: i128,
    pub last_update_date: NaiveDate,
    /// Index value backing the last update; `None` until the first seed.
    pub last_index_value: Option<i64>,
    /// Reference date (YYYYMMDD) of the last applied index reading.
    pub last_reference_date: u32,
    /// Compounded index factor, 8 decimals.
    pub accumulated_factor: i128,
}

/// DI accumulation state, 9 decimals.
///
/// Resets to exactly 1e9 when a coupon is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiAccrual {
    pub factor: i128,
    pub last_update_date: NaiveDate,
}

/// A coupon preview: amount and the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    /// Coupon amount per unit, 6 decimals.
    pub amount_per_unit: i128,
    /// Total annual rate applied in basis points (spread included). Zero for
    /// DI-linked coupons, which are defined by the accumulated factor.
    pub rate_bps_used: i64,
    /// Oracle index value consulted, 8 decimals; zero when none was needed.
    pub index_value_used: i64,
}

// =============================================================================
// Engine
// =============================================================================

/// Valuation state and operations for one debenture.
///
/// The lifecycle state machine owns one of these and layers status and
/// authorization checks on top; the math itself lives here so it can be
/// exercised without any collaborator wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    /// Original face value per unit (VNE), 6 decimals. Never changes.
    vne: i128,
    pub vna: VnaRecord,
    pub di: DiAccrual,
}

impl Valuation {
    pub fn new(terms: &DebentureTerms) -> Self {
        Self {
            vne: terms.face_value,
            vna: VnaRecord {
                value: terms.face_value,
                last_update_date: terms.issue_date,
                last_index_value: None,
                last_reference_date: 0,
                accumulated_factor: VNA_FACTOR_PRECISION,
            },
            di: DiAccrual {
                factor: FACTOR_PRECISION,
                last_update_date: terms.issue_date,
            },
        }
    }

    /// Original face value per unit.
    pub fn vne(&self) -> i128 {
        self.vne
    }

    /// Folds the latest index reading into VNA.
    ///
    /// Only meaningful for IPCA/IGPM-linked debentures. The first successful
    /// call seeds `last_index_value` without moving VNA, since there is no
    /// prior ratio to apply. Later calls compound the ratio of consecutive
    /// readings into the accumulated factor and recompute
    /// `VNA = VNE x factor / 1e8`.
    ///
    /// Returns `(old_vna, new_vna)`.
    pub fn update_vna(
        &mut self,
        terms: &DebentureTerms,
        oracle: &dyn RateOracle,
        now: DateTime<Utc>,
    ) -> Result<(i128, i128), crate::errors::Error> {
        let rate_type = terms
            .rate_link
            .index_rate_type()
            .ok_or(ValuationError::IndexNotLinked(terms.rate_link))?;
        let reading = oracle.current(rate_type)?;
        if reading.reference_date <= self.vna.last_reference_date {
            return Err(ValuationError::StaleIndexRead {
                reference_date: reading.reference_date,
                last_update: self.vna.last_reference_date,
            }
            .into());
        }
        if reading.value <= 0 {
            return Err(ValuationError::NonPositiveIndex(reading.value).into());
        }

        let old_value = self.vna.value;
        match self.vna.last_index_value {
            None => {
                // Seed only. VNA stays put until a second reading provides a
                // ratio.
            }
            Some(previous) => {
                let ratio = index_ratio(reading.value, previous)?;
                self.vna.accumulated_factor =
                    mul_div(self.vna.accumulated_factor, ratio, VNA_FACTOR_PRECISION);
                self.vna.value = mul_div(self.vne, self.vna.accumulated_factor, VNA_FACTOR_PRECISION);
            }
        }
        self.vna.last_index_value = Some(reading.value);
        self.vna.last_reference_date = reading.reference_date;
        self.vna.last_update_date = now.date_naive();
        Ok((old_value, self.vna.value))
    }

    /// Folds one daily DI factor into the running accumulation.
    ///
    /// Returns the new accumulated factor. Fails with `IndexNotLinked` for
    /// non-DI debentures.
    pub fn update_di_factor(
        &mut self,
        terms: &DebentureTerms,
        di_rate: i64,
        today: NaiveDate,
    ) -> Result<i128, ValuationError> {
        let mode = terms
            .rate_link
            .di_mode()
            .ok_or(ValuationError::IndexNotLinked(terms.rate_link))?;
        let daily = di_daily_factor(di_rate, mode)?;
        self.di.factor = accumulate(self.di.factor, daily);
        self.di.last_update_date = today;
        Ok(self.di.factor)
    }

    /// Resets the DI factor to exactly 1.0, done at each coupon record.
    pub fn reset_di_factor(&mut self, today: NaiveDate) {
        self.di.factor = FACTOR_PRECISION;
        self.di.last_update_date = today;
    }

    /// Par unit price including accrued interest.
    ///
    /// DI-linked: `VNA x factor / 1e9`. Otherwise pro-rata on the fixed rate
    /// or spread since the last coupon date.
    pub fn pu_par(&self, terms: &DebentureTerms, last_coupon_date: NaiveDate, today: NaiveDate) -> i128 {
        if terms.rate_link.is_di_linked() {
            return mul_div(self.vna.value, self.di.factor, FACTOR_PRECISION);
        }
        let days = business_days_since(last_coupon_date, today) as i128;
        let accrued = mul_div(
            self.vna.value,
            terms.rate_link.rate_bps() as i128 * days,
            BUSINESS_DAYS_PER_YEAR * BPS_DENOMINATOR,
        );
        self.vna.value + accrued
    }

    /// Previews the next coupon without mutating anything.
    ///
    /// DI-linked coupons pay only the excess over par accrued since the last
    /// reset: `VNA x (factor - 1e9) / 1e9`. Fixed and index-plus-spread
    /// coupons are pro-rata over one coupon period at the total annual rate.
    pub fn next_coupon(
        &self,
        terms: &DebentureTerms,
        oracle: &dyn RateOracle,
    ) -> Result<CouponQuote, crate::errors::Error> {
        if terms.rate_link.is_di_linked() {
            let amount = mul_div(
                self.vna.value,
                self.di.factor - FACTOR_PRECISION,
                FACTOR_PRECISION,
            );
            return Ok(CouponQuote {
                amount_per_unit: amount,
                rate_bps_used: 0,
                index_value_used: 0,
            });
        }

        let (total_bps, index_value) = match terms.rate_link.index_rate_type() {
            Some(rate_type) => {
                let reading = oracle.current(rate_type)?;
                if reading.value <= 0 {
                    return Err(ValuationError::NonPositiveIndex(reading.value).into());
                }
                let index_bps = reading.value / RATE_UNITS_PER_BPS;
                (index_bps + terms.rate_link.rate_bps(), reading.value)
            }
            None => (terms.rate_link.rate_bps(), 0),
        };
        let amount = mul_div(
            self.vna.value,
            total_bps as i128 * terms.coupon_frequency_days as i128,
            BUSINESS_DAYS_PER_YEAR * BPS_DENOMINATOR,
        );
        Ok(CouponQuote {
            amount_per_unit: amount,
            rate_bps_used: total_bps,
            index_value_used: index_value,
        })
    }

    /// Decrements VNA by an amortized amount. The caller has already checked
    /// the amount against the schedule entry's basis and the current VNA, so
    /// VNA decreases monotonically and never crosses zero.
    pub(crate) fn amortize(&mut self, amount_per_unit: i128) -> i128 {
        self.vna.value -= amount_per_unit;
        self.vna.value
    }
}
