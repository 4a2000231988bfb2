use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places shown at the presentation boundary.
pub const PRESENTATION_DP: u32 = 2;

/// Round a value for presentation: two decimal places, midpoints away from
/// zero (2.345 -> 2.35, -2.345 -> -2.35).
///
/// Only ever applied to values leaving the system. Schedules are computed
/// unrounded so rounding error does not compound month over month.
pub fn round_presentation(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRESENTATION_DP, RoundingStrategy::MidpointAwayFromZero)
}
