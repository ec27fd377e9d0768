//! Raw listing ingestion.
//!
//! Turns [`RawRecord`]s into [`NormalizedRecord`]s. Only identity problems
//! reject a listing; unreadable prices, dates and promotions are kept as
//! `None`/`0.0` because the listing still takes part in deduplication.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::models::{NormalizedRecord, RawRecord};

use super::field_parsers::{parse_date, parse_price, parse_promotion};
use super::name_normalizer::normalize_name;

/// Name placeholders a shop prints when it has no data (case-insensitive).
pub const NAME_SENTINELS: [&str; 3] = ["non disponible", "n/a", "not available"];

/// Why a raw listing was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("empty product name")]
    EmptyName,
    #[error("placeholder product name")]
    SentinelName,
    #[error("product name empty after normalization")]
    EmptyAfterNormalization,
    #[error("missing site identifier")]
    MissingSite,
}

/// Per-reason rejection tally for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub empty_name: usize,
    pub sentinel_name: usize,
    pub empty_after_normalization: usize,
    pub missing_site: usize,
}

impl RejectionCounts {
    fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::EmptyName => self.empty_name += 1,
            RejectReason::SentinelName => self.sentinel_name += 1,
            RejectReason::EmptyAfterNormalization => self.empty_after_normalization += 1,
            RejectReason::MissingSite => self.missing_site += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.empty_name + self.sentinel_name + self.empty_after_normalization + self.missing_site
    }
}

/// Accepted records plus the tally of what was dropped
#[derive(Debug, Default)]
pub struct IngestBatch {
    pub records: Vec<NormalizedRecord>,
    pub received: usize,
    pub rejected: RejectionCounts,
}

/// Returns true when `name` is a "no data" placeholder.
pub fn is_name_sentinel(name: &str) -> bool {
    let trimmed = name.trim();
    NAME_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Cleans one raw listing.
pub fn ingest(raw: &RawRecord) -> Result<NormalizedRecord, RejectReason> {
    let name = raw.name.trim();
    if name.is_empty() {
        return Err(RejectReason::EmptyName);
    }
    if is_name_sentinel(name) {
        return Err(RejectReason::SentinelName);
    }

    let canonical = normalize_name(name);
    if canonical.is_empty() {
        return Err(RejectReason::EmptyAfterNormalization);
    }
    // quotes and variant suffixes can hide a placeholder
    if is_name_sentinel(&canonical) {
        return Err(RejectReason::SentinelName);
    }

    let site = raw.site.trim();
    if site.is_empty() {
        return Err(RejectReason::MissingSite);
    }

    Ok(NormalizedRecord {
        name: canonical,
        price: parse_price(&raw.price_text),
        price_raw: raw.price_text.trim().to_string(),
        site: site.to_string(),
        category: raw.category.trim().to_string(),
        collected_at: parse_date(&raw.collected_at),
        collected_at_raw: raw.collected_at.trim().to_string(),
        promotion_amount: parse_promotion(&raw.promotion_text),
        promotion_raw: raw.promotion_text.trim().to_string(),
    })
}

/// Cleans a whole sequence, counting rejections instead of discarding them silently.
pub fn ingest_all<I>(raws: I) -> IngestBatch
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut batch = IngestBatch::default();

    for raw in raws {
        batch.received += 1;
        match ingest(&raw) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                debug!("Rejected listing '{}' from '{}': {}", raw.name, raw.site, reason);
                batch.rejected.record(reason);
            }
        }
    }

    batch
}

#[cfg(test)]
#[path = "ingestor_tests.rs"]
mod tests;
