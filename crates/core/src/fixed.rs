//! Integer fixed-point helpers.
//!
//! Every money and rate computation in this crate runs on scaled `i128`
//! integers with truncating division. Precision loss is bounded to one unit
//! of the result scale per `mul_div` call, which keeps rounding auditable in
//! a way float math never is.

use rust_decimal::Decimal;

/// `a * b / denominator` with truncating division.
///
/// All operands in this crate are far from `i128` overflow (values are at
/// most ~10^22 after one multiplication), so the product is computed
/// directly.
pub fn mul_div(a: i128, b: i128, denominator: i128) -> i128 {
    debug_assert!(denominator != 0);
    a * b / denominator
}

/// Renders a scaled integer as a `Decimal` for display and serialization
/// boundaries. `to_decimal(1_090_000_000, 8)` is `10.90000000`.
pub fn to_decimal(value: i128, scale: u32) -> Decimal {
    Decimal::from_i128_with_scale(value, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FACTOR_PRECISION, PU_PRECISION};

    #[test]
    fn mul_div_truncates_toward_zero() {
        assert_eq!(mul_div(10, 10, 3), 33);
        assert_eq!(mul_div(1, 1, 2), 0);
        assert_eq!(mul_div(7, PU_PRECISION, PU_PRECISION), 7);
    }

    #[test]
    fn factor_identity() {
        let factor = 1_000_432_539i128;
        assert_eq!(mul_div(FACTOR_PRECISION, factor, FACTOR_PRECISION), factor);
    }

    #[test]
    fn to_decimal_scales() {
        assert_eq!(to_decimal(1_090_000_000, 8).to_string(), "10.90000000");
        assert_eq!(to_decimal(1_000_000, 6).to_string(), "1.000000");
    }
}
