//! Field parsing utilities for scraped listings.
//!
//! Pure functions turning the price, promotion and date texts found on the
//! shop pages into typed values. None of them fails: a text that cannot be
//! read degrades to `None` (price, date) or `0.0` (promotion).
//!
//! A comma inside an amount is always a thousands separator and is dropped,
//! so `"1,549.00 Dhs"` reads as `1549.00`. The shops all print amounts with a
//! dot as decimal separator. Promotion texts follow the same rule: a comma is
//! never read as a decimal point there either, so `"-39,00 MAD"` gives `3900`.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref CURRENCY_MARKERS: Regex = Regex::new(r"(?i)mad|dhs").unwrap();
    static ref NUMERIC_RUN: Regex = Regex::new(r"[0-9.,]+").unwrap();
}

/// Promotion texts meaning "no promotion" (compared case-insensitively).
pub const PROMOTION_SENTINELS: [&str; 3] = ["aucune", "none", "no promotion"];

/// Accepted collection date layouts, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a displayed price such as `"1,549.00 Dhs"` or `"13,299.00MAD"`.
///
/// Spaces (including non-breaking ones) and currency markers are removed,
/// then the first run of digits, dots and commas is read as the amount.
///
/// # Returns
/// The amount in MAD, or `None` when the text holds no readable number.
pub fn parse_price(text: &str) -> Option<f64> {
    debug!("Parsing price string: {text}");
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let stripped = CURRENCY_MARKERS.replace_all(&compact, "");

    let run = NUMERIC_RUN.find(&stripped)?.as_str();
    let digits = run.replace(',', "");
    let digits = digits.trim_end_matches('.');

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            debug!("No usable amount in price '{text}'");
            None
        }
    }
}

/// Parses a promotion text into the discount magnitude.
///
/// `""`, whitespace and the sentinels in [`PROMOTION_SENTINELS`] mean no
/// promotion. A leading minus (as in `"-39.00MAD"`) is dropped, the stored
/// value is always the size of the discount.
///
/// # Returns
/// The discount in MAD, `0.0` when there is none or it cannot be read.
pub fn parse_promotion(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_promotion_sentinel(trimmed) {
        return 0.0;
    }

    let compact: String = CURRENCY_MARKERS
        .replace_all(trimmed, "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let magnitude = compact.trim_start_matches(['-', '+', '\u{2212}']);

    match magnitude.parse::<f64>() {
        Ok(value) if value.is_finite() => value.abs(),
        _ => {
            debug!("Promotion '{text}' is not an amount, treating as no promotion");
            0.0
        }
    }
}

/// Returns true when `text` is one of the "no promotion" placeholders.
pub fn is_promotion_sentinel(text: &str) -> bool {
    let trimmed = text.trim();
    PROMOTION_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Parses a collection date, trying `YYYY-MM-DD` first and `M/D/YYYY` second.
///
/// Callers keep the original text next to the result; a `None` here never
/// replaces it.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok());

    if parsed.is_none() && !trimmed.is_empty() {
        debug!("Unrecognized collection date '{text}'");
    }
    parsed
}

#[cfg(test)]
#[path = "field_parsers_tests.rs"]
mod tests;
