//! Listing cleaning: field parsers, title normalization and ingestion.

pub mod field_parsers;
pub mod ingestor;
pub mod name_normalizer;

pub use field_parsers::{parse_date, parse_price, parse_promotion};
pub use ingestor::{ingest, ingest_all, IngestBatch, RejectReason, RejectionCounts};
pub use name_normalizer::normalize_name;
