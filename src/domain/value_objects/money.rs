//! Money helpers.
//!
//! Prices are `Decimal` amounts in the store currency, kept at two
//! fractional digits.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits every stored price carries.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to the store's money scale (half away from zero).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum a sequence of prices.
pub fn sum_money<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| acc + a)
}

/// Apply a percentage discount (0..=100) to a price and round the result.
///
/// Percentages outside the range are clamped; the result is never negative.
pub fn apply_percent_off(price: Decimal, percent: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let percent = percent.clamp(Decimal::ZERO, hundred);
    let discounted = round_money(price * (hundred - percent) / hundred);
    discounted.max(Decimal::ZERO)
}
