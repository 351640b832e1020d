/// Decimal places for DI accumulation factors.
pub const FACTOR_DECIMALS: u32 = 9;

/// Scale for DI accumulation factors: 10^9. A factor of exactly
/// `FACTOR_PRECISION` means "at par, nothing accrued".
pub const FACTOR_PRECISION: i128 = 1_000_000_000;

/// Decimal places for the VNA index accumulation factor.
pub const VNA_FACTOR_DECIMALS: u32 = 8;

/// Scale for the VNA index accumulation factor: 10^8.
pub const VNA_FACTOR_PRECISION: i128 = 100_000_000;

/// Decimal places for unit prices and face values (PU convention).
pub const PU_DECIMALS: u32 = 6;

/// Scale for unit prices and face values: 10^6.
pub const PU_PRECISION: i128 = 1_000_000;

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Two-decimal percentage denominator: 10_000 = 100.00% (used for %DI).
pub const PERCENT_2DP_DENOMINATOR: i128 = 10_000;

/// Brazilian market convention: the year has 252 business days.
pub const BUSINESS_DAYS_PER_YEAR: i128 = 252;
