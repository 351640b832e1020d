//! Index accrual engine.
//!
//! Pure fixed-point functions shared by the valuation engine: DI daily
//! factors, multiplicative factor accumulation, and index ratios for
//! IPCA/IGPM pro-rata updates.
//!
//! # Conventions
//!
//! The DI daily factor uses a first-order linear approximation of the
//! 252nd-root compounding formula:
//!
//! ```text
//! daily = 1 + (annual_rate x percent_di / 100) / (100 x 252)
//! ```
//!
//! This matches ANBIMA-style quotation closely for realistic rates but is
//! not exact compounding. Day counting treats every calendar day as a
//! business day; there is no holiday calendar.

use chrono::NaiveDate;

use crate::constants::{
    BPS_DENOMINATOR, BUSINESS_DAYS_PER_YEAR, FACTOR_PRECISION, PERCENT_2DP_DENOMINATOR,
    VNA_FACTOR_PRECISION,
};
use crate::errors::ValuationError;
use crate::fixed::mul_div;
use lastro_oracle::RATE_PRECISION;

/// How a DI-linked debenture participates in the DI rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiMode {
    /// Pays a percentage of DI (e.g., 104.50% of DI), two decimal places.
    PercentDi { percent_2dp: i64 },
    /// Pays 100% of DI plus a fixed annual spread in basis points.
    Spread { spread_bps: i64 },
}

/// Daily DI factor at 9 decimals for one business day.
pub fn di_daily_factor(di_rate: i64, mode: DiMode) -> Result<i128, ValuationError> {
    if di_rate < 0 {
        return Err(ValuationError::NegativeRate(di_rate));
    }
    match mode {
        DiMode::PercentDi { percent_2dp } => {
            if percent_2dp < 0 {
                return Err(ValuationError::NegativeRate(percent_2dp));
            }
            Ok(linear_daily_factor(di_rate, percent_2dp))
        }
        DiMode::Spread { spread_bps } => {
            if spread_bps < 0 {
                return Err(ValuationError::NegativeRate(spread_bps));
            }
            let di_daily = linear_daily_factor(di_rate, PERCENT_2DP_DENOMINATOR as i64);
            let spread_daily = FACTOR_PRECISION
                + mul_div(
                    FACTOR_PRECISION,
                    spread_bps as i128,
                    BPS_DENOMINATOR * BUSINESS_DAYS_PER_YEAR,
                );
            Ok(mul_div(di_daily, spread_daily, FACTOR_PRECISION))
        }
    }
}

/// `1 + rate_fraction x percent / 252` at 9 decimals.
///
/// `di_rate` is an annual percentage scaled by 10^8, so the fraction is
/// `di_rate / (100 x 10^8)`; `percent` is scaled by 10^4 (100.00% = 10_000).
fn linear_daily_factor(di_rate: i64, percent_2dp: i64) -> i128 {
    FACTOR_PRECISION
        + (di_rate as i128 * percent_2dp as i128 * FACTOR_PRECISION)
            / (100
                * RATE_PRECISION as i128
                * PERCENT_2DP_DENOMINATOR
                * BUSINESS_DAYS_PER_YEAR)
}

/// Folds one daily factor into a running accumulation factor (9 decimals,
/// truncating).
pub fn accumulate(factor: i128, daily_factor: i128) -> i128 {
    mul_div(factor, daily_factor, FACTOR_PRECISION)
}

/// `new / old` as an 8-decimal factor, for IPCA/IGPM pro-rata updates.
pub fn index_ratio(new_value: i64, old_value: i64) -> Result<i128, ValuationError> {
    if new_value <= 0 {
        return Err(ValuationError::NonPositiveIndex(new_value));
    }
    if old_value <= 0 {
        return Err(ValuationError::NonPositiveIndex(old_value));
    }
    Ok(mul_div(
        new_value as i128,
        VNA_FACTOR_PRECISION,
        old_value as i128,
    ))
}

/// Day count between two dates under the all-days-are-business-days
/// simplification. Never negative.
pub fn business_days_since(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDI_10_90: i64 = 1_090_000_000;

    #[test]
    fn daily_factor_at_100_percent_di() {
        // 10.90% / 252 = 4.325396...e-4 per day; 9 decimals, truncated.
        let daily = di_daily_factor(CDI_10_90, DiMode::PercentDi { percent_2dp: 10_000 }).unwrap();
        assert_eq!(daily, 1_000_432_539);
    }

    #[test]
    fn daily_factor_at_104_50_percent_di() {
        let daily = di_daily_factor(CDI_10_90, DiMode::PercentDi { percent_2dp: 10_450 }).unwrap();
        assert_eq!(daily, 1_000_452_003);
    }

    #[test]
    fn daily_factor_di_plus_spread() {
        // DI part: 432_539; spread part at 0.50%: 19_841; cross term adds 8.
        let daily = di_daily_factor(CDI_10_90, DiMode::Spread { spread_bps: 50 }).unwrap();
        assert_eq!(daily, 1_000_452_388);
    }

    #[test]
    fn zero_rate_yields_unit_factor() {
        let daily = di_daily_factor(0, DiMode::PercentDi { percent_2dp: 10_000 }).unwrap();
        assert_eq!(daily, FACTOR_PRECISION);
        let daily = di_daily_factor(0, DiMode::Spread { spread_bps: 0 }).unwrap();
        assert_eq!(daily, FACTOR_PRECISION);
    }

    #[test]
    fn negative_inputs_rejected() {
        assert!(di_daily_factor(-1, DiMode::PercentDi { percent_2dp: 10_000 }).is_err());
        assert!(di_daily_factor(1, DiMode::PercentDi { percent_2dp: -1 }).is_err());
        assert!(di_daily_factor(1, DiMode::Spread { spread_bps: -1 }).is_err());
    }

    #[test]
    fn accumulate_is_multiplicative_and_truncating() {
        let factor = accumulate(FACTOR_PRECISION, 1_000_432_539);
        assert_eq!(factor, 1_000_432_539);

        // One more day compounds on the accumulated value, floor division.
        let factor = accumulate(factor, 1_000_432_539);
        assert_eq!(factor, 1_000_865_265);
    }

    #[test]
    fn one_hundred_eighty_days_of_di_spread_accrual() {
        // Scenario: CDI 10.90%, DI + 0.50% spread, daily updates for 180 days.
        // The exact result is defined by the linear approximation with
        // truncating accumulation, not by true 252nd-root compounding.
        let daily = di_daily_factor(CDI_10_90, DiMode::Spread { spread_bps: 50 }).unwrap();
        let mut factor = FACTOR_PRECISION;
        for _ in 0..180 {
            let next = accumulate(factor, daily);
            assert!(next > factor);
            factor = next;
        }

        // Simple interest lower bound: 1 + 180 x 452_388 / 1e9.
        assert!(factor > FACTOR_PRECISION + 180 * 452_388);
        // 180-fold truncating product of 1.000452388.
        assert_eq!(factor, 1_084_817_030);
    }

    #[test]
    fn index_ratio_basic() {
        assert_eq!(index_ratio(103_000_000, 100_000_000).unwrap(), 103_000_000);
        assert_eq!(index_ratio(100_000_000, 103_000_000).unwrap(), 97_087_378);
    }

    #[test]
    fn index_ratio_rejects_non_positive() {
        assert_eq!(
            index_ratio(0, 100).unwrap_err(),
            ValuationError::NonPositiveIndex(0)
        );
        assert_eq!(
            index_ratio(100, -5).unwrap_err(),
            ValuationError::NonPositiveIndex(-5)
        );
    }

    #[test]
    fn business_days_are_calendar_days() {
        let from = NaiveDate::from_ymd_opt(2024, 11, 22).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 11, 25).unwrap();
        // Friday to Monday counts the weekend: no holiday calendar.
        assert_eq!(business_days_since(from, to), 3);
        assert_eq!(business_days_since(to, from), 0);
    }
}
