//! Product title canonicalization.
//!
//! Shops decorate the same product with processor specs, colors and bundle
//! notes. Stripping those lets listings from different sites share a key.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// From a processor marker like " i5-8265U" to the end of the title.
    static ref SPEC_SUFFIX: Regex = Regex::new(r"\s+i\d[-\w/]*.*$").unwrap();
    /// A glued variant like "-noir" ending the title.
    static ref VARIANT_SUFFIX: Regex = Regex::new(r"\s*-\S+$").unwrap();
}

/// Cut points, in priority order. Only the first one present is applied.
const DELIMITERS: [&str; 5] = [" – ", " - ", ",", "/", "+"];

const QUOTES: [char; 2] = ['"', '\''];

/// Canonicalizes a raw product title.
///
/// Steps, each on the output of the previous one:
/// 1. trim whitespace and one pair of enclosing quotes
/// 2. drop a processor spec suffix (`" i5-8265U/8GB..."`)
/// 3. drop a glued variant suffix (`"...-noir"`)
/// 4. keep only the text before the first delimiter found
///
/// May return an empty string; the ingestor rejects those.
pub fn normalize_name(raw: &str) -> String {
    let unquoted = strip_enclosing_quotes(raw.trim());
    let without_specs = SPEC_SUFFIX.replace(unquoted, "");
    let without_variant = VARIANT_SUFFIX.replace(&without_specs, "");
    truncate_at_delimiter(&without_variant).trim().to_string()
}

fn strip_enclosing_quotes(text: &str) -> &str {
    for quote in QUOTES {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[1..text.len() - 1].trim();
        }
    }
    text
}

fn truncate_at_delimiter(text: &str) -> &str {
    DELIMITERS
        .iter()
        .find_map(|delimiter| text.find(delimiter).map(|pos| &text[..pos]))
        .unwrap_or(text)
}
