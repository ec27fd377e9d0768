//! One cleaning run: raw listings in, deduplicated snapshot out.

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::cleaning::{ingest_all, RejectionCounts};
use crate::dedup::deduplicate_counting;
use crate::error::Result;
use crate::models::RawRecord;
use crate::snapshot::Snapshot;
use crate::sources::{collect_sources, RecordSource};

/// What happened to the listings of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Raw listings handed to the run
    pub received: usize,
    /// Listings that passed ingestion
    pub accepted: usize,
    /// Listings dropped at ingestion, by reason
    pub rejected: RejectionCounts,
    /// Accepted listings folded into an earlier observation
    pub duplicates_merged: usize,
}

/// Result of a cleaning run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub snapshot: Snapshot,
    pub report: IngestReport,
}

/// Ingests and deduplicates `raws` into a fresh snapshot.
pub fn run_pipeline<I>(raws: I) -> PipelineOutcome
where
    I: IntoIterator<Item = RawRecord>,
{
    let batch = ingest_all(raws);
    let accepted = batch.records.len();
    let (snapshot, duplicates_merged) = deduplicate_counting(batch.records);

    let report = IngestReport {
        received: batch.received,
        accepted,
        rejected: batch.rejected,
        duplicates_merged,
    };

    info!(
        "Cleaned {} listings: {} accepted, {} rejected, {} duplicates merged, {} in snapshot",
        report.received,
        report.accepted,
        report.rejected.total(),
        report.duplicates_merged,
        snapshot.len()
    );

    PipelineOutcome { snapshot, report }
}

/// Collects every source concurrently, then runs one sequential pipeline pass.
pub async fn run_sources(sources: Vec<Arc<dyn RecordSource>>) -> Result<PipelineOutcome> {
    let raws = collect_sources(sources).await?;
    Ok(run_pipeline(raws))
}
