//! Czech number rendering: thousands separated by a space, decimal comma.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats `value` with `decimals` places, e.g. `1234.5` with 2 places as `1 234,50`.
///
/// Halves round away from zero, so 132.5 km is printed as `133`.
pub fn format_cz(value: impl Into<Decimal>, decimals: u32) -> String {
    let rounded = value
        .into()
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let rendered = format!("{:.*}", decimals as usize, rounded.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(rendered.len() + integer.len() / 3 + 1);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    if let Some(fraction) = fraction {
        grouped.push(',');
        grouped.push_str(fraction);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.insert(0, '-');
    }

    grouped
}
