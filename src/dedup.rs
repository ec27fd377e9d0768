//! Deduplication of normalized listings.
//!
//! Listings sharing a [`DedupKey`] are the same observation; the cheapest
//! known one survives. A known price always beats an unknown one, and on a
//! tie the first listing seen is kept.

use std::collections::HashMap;

use crate::models::{DedupKey, NormalizedRecord};
use crate::snapshot::Snapshot;

/// Collapses repeated observations into a [`Snapshot`].
///
/// Single pass over `records` with one map lookup each. The result is sorted
/// by name, then site, then date so equal inputs give identical snapshots.
pub fn deduplicate<I>(records: I) -> Snapshot
where
    I: IntoIterator<Item = NormalizedRecord>,
{
    let (retained, _) = deduplicate_counting(records);
    retained
}

/// Same as [`deduplicate`], also returning how many listings were merged away.
pub fn deduplicate_counting<I>(records: I) -> (Snapshot, usize)
where
    I: IntoIterator<Item = NormalizedRecord>,
{
    let mut slots: HashMap<DedupKey, usize> = HashMap::new();
    let mut retained: Vec<NormalizedRecord> = Vec::new();
    let mut merged = 0;

    for record in records {
        let key = record.key();
        match slots.get(&key).copied() {
            Some(slot) => {
                merged += 1;
                if beats(&record, &retained[slot]) {
                    retained[slot] = record;
                }
            }
            None => {
                slots.insert(key, retained.len());
                retained.push(record);
            }
        }
    }

    retained.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.site.cmp(&b.site))
            .then_with(|| a.collected_at.cmp(&b.collected_at))
    });

    (Snapshot::from_unique(retained), merged)
}

/// Strictly cheaper with a known price; equal prices keep the incumbent.
fn beats(candidate: &NormalizedRecord, incumbent: &NormalizedRecord) -> bool {
    match (candidate.price, incumbent.price) {
        (Some(new), Some(old)) => new < old,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
