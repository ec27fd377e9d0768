//! Price Tracker - scraped listing normalization and price queries
//!
//! Cleans listings scraped from several e-commerce sites, keeps the cheapest
//! observation of each product and answers cheapest-price and promotion
//! queries over the resulting snapshot.

pub mod cleaning;
pub mod dedup;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod snapshot;
pub mod sources;
pub mod web;

pub use cleaning::{ingest, normalize_name, parse_date, parse_price, parse_promotion, RejectReason};
pub use dedup::deduplicate;
pub use error::{PriceError, Result};
pub use models::{DedupKey, NormalizedRecord, RawRecord, SNAPSHOT_HEADER};
pub use pipeline::{run_pipeline, run_sources, IngestReport, PipelineOutcome};
pub use query::{LowestPrice, PromotionSummary, QueryEngine, QueryError};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot};
pub use sources::{CsvRecordSource, RecordSource};
