//! Parsing of locale-formatted monetary amounts such as `"1 000,50 €"`.
//!
//! Parsing never fails: anything that cannot be read as a number becomes
//! zero, and negative results are clamped to zero.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::workbook::Cell;

/// Parse a spreadsheet cell as a non-negative amount.
pub fn parse_amount(raw: Option<&Cell>) -> Decimal {
    match raw {
        None | Some(Cell::Empty) | Some(Cell::Bool(_)) => Decimal::ZERO,
        Some(Cell::Text(s)) => parse_amount_str(s),
        Some(Cell::Number(n)) => decimal_from_f64(*n)
            .map(non_negative)
            .unwrap_or(Decimal::ZERO),
    }
}

/// Parse free text as a non-negative amount.
///
/// Currency symbols and every kind of whitespace (including the no-break
/// spaces French locales use as thousands separators) are removed and a
/// decimal comma becomes a decimal point.
pub fn parse_amount_str(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| !is_ignored(*c))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    parse_decimal(&cleaned)
        .map(non_negative)
        .unwrap_or(Decimal::ZERO)
}

/// Convert a float through its shortest textual form, so `0.1` stays `0.1`
/// instead of its binary expansion.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    parse_decimal(&value.to_string())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn is_ignored(c: char) -> bool {
    // `char::is_whitespace` covers U+00A0, U+202F and U+2009.
    matches!(c, '€' | '$' | '£') || c.is_whitespace()
}

fn non_negative(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}
