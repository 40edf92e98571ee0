use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DisplayConfig;

fn group_int_digits(int_part: &str) -> String {
    // Space every 3 digits, French style.
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(' ');
        }
    }
    out
}

/// Render an amount the way the dashboard shows it: `270 500 €`.
///
/// The value is rounded half away from zero to `display.decimals` places and
/// padded to exactly that many. The decimal separator stays a point.
pub fn format_amount(value: Decimal, display: &DisplayConfig) -> String {
    let rounded = value.round_dp_with_strategy(
        display.decimals,
        RoundingStrategy::MidpointAwayFromZero,
    );
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let abs = rounded.abs();
    let text = format!("{:.*}", display.decimals as usize, abs);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_int_digits(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if !display.currency_symbol.is_empty() {
        out.push(' ');
        out.push_str(&display.currency_symbol);
    }
    out
}

/// Render a fraction (`0.25`) as a percentage with one decimal (`25.0 %`).
pub fn format_share(share: Decimal) -> String {
    let pct = (share * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.1} %")
}
