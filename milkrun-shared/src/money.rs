//! Precision of stored amounts and liters. These match the `NUMERIC`
//! column scales, so a value that fits is stored exactly.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for prices and bill amounts
pub const MONEY_SCALE: u32 = 2;
/// Decimal places kept for liters
pub const QUANTITY_SCALE: u32 = 3;

/// Round an amount the way a `NUMERIC(_, 2)` column does on insert
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `value` has no significant digits past `scale` decimal places.
pub fn fits_scale(value: Decimal, scale: u32) -> bool {
    value.round_dp(scale) == value
}
