//! Snapshot store
//!
//! The deduplicated listing set and its flat file form. The file has a fixed
//! header ([`SNAPSHOT_HEADER`]); any other header is a configuration error
//! and aborts the load. Writes always replace the whole file.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::cleaning::field_parsers::{parse_date, parse_price, parse_promotion};
use crate::cleaning::ingestor::is_name_sentinel;
use crate::dedup::deduplicate;
use crate::error::{PriceError, Result};
use crate::models::{NormalizedRecord, RawRecord, SNAPSHOT_HEADER};

/// Immutable listing set, unique by [`crate::models::DedupKey`].
///
/// Only [`deduplicate`] builds one, so the uniqueness invariant always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<NormalizedRecord>,
}

impl Snapshot {
    pub(crate) fn from_unique(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }
}

/// Fails unless `headers` is exactly the snapshot column set, in order.
pub fn check_header(headers: &csv::StringRecord) -> Result<()> {
    if headers.iter().eq(SNAPSHOT_HEADER.iter().copied()) {
        return Ok(());
    }
    Err(PriceError::SchemaMismatch {
        expected: SNAPSHOT_HEADER.join(","),
        found: headers.iter().collect::<Vec<_>>().join(","),
    })
}

/// Serializes `snapshot` with its header row.
pub fn write_snapshot<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(SNAPSHOT_HEADER)?;

    for record in snapshot.iter() {
        writer.write_record([
            record.name.as_str(),
            record.price_display().as_str(),
            record.site.as_str(),
            record.category.as_str(),
            record.collected_at_display().as_str(),
            record.promotion_raw.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Replaces the file at `path` with `snapshot`.
///
/// The rows go to a sibling temporary file first, which is then renamed over
/// the target, so readers never see a half-written snapshot.
pub fn save_snapshot<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let staging = staging_path(path);

    let file = fs::File::create(&staging)?;
    if let Err(e) = write_snapshot(snapshot, file) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }

    info!("Wrote {} listings to {}", snapshot.len(), path.display());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "snapshot.csv".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Reads a snapshot back from its delimited form.
///
/// Short rows are padded with empty strings. Rows without a usable name or
/// site are skipped with a warning. Names are taken as already canonical.
pub fn read_snapshot<R: Read>(reader: R) -> Result<Snapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    check_header(reader.headers()?)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let line_num = index + 2; // header is line 1
        if row.len() > SNAPSHOT_HEADER.len() {
            warn!(
                "Line {line_num}: ignoring {} extra field(s) in snapshot row",
                row.len() - SNAPSHOT_HEADER.len()
            );
        }
        match restore_record(&RawRecord::from_row(&row)) {
            Some(record) => records.push(record),
            None => warn!("Line {line_num}: skipping snapshot row without name or site"),
        }
    }

    Ok(deduplicate(records))
}

/// Loads the snapshot file at `path`.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let snapshot = read_snapshot(file)?;
    info!("Loaded {} listings from {}", snapshot.len(), path.display());
    Ok(snapshot)
}

fn restore_record(row: &RawRecord) -> Option<NormalizedRecord> {
    let name = row.name.trim();
    let site = row.site.trim();
    if name.is_empty() || is_name_sentinel(name) || site.is_empty() {
        return None;
    }

    Some(NormalizedRecord {
        name: name.to_string(),
        price: parse_price(&row.price_text),
        price_raw: row.price_text.trim().to_string(),
        site: site.to_string(),
        category: row.category.trim().to_string(),
        collected_at: parse_date(&row.collected_at),
        collected_at_raw: row.collected_at.trim().to_string(),
        promotion_amount: parse_promotion(&row.promotion_text),
        promotion_raw: row.promotion_text.trim().to_string(),
    })
}
