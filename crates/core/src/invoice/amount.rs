//! Decimal amount parsing and formatting

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Parse an amount, accepting `,` as the decimal separator.
pub(crate) fn parse(text: &str) -> Option<Decimal> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Format with exactly two fractional digits, rounding half away from zero.
pub(crate) fn format(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// `first + second` when both parse and the sum is representable.
pub(crate) fn sum_texts(first: Option<&str>, second: Option<&str>) -> Option<String> {
    parse(first?)?.checked_add(parse(second?)?).map(format)
}
