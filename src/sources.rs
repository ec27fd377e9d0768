//! Source adapters
//!
//! A source yields the raw listings of one shop. Scraping itself (HTTP,
//! HTML selection, pacing between requests) stays outside this crate; the
//! adapter provided here reads the raw exports the scrapers write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::error::{PriceError, Result};
use crate::models::{RawRecord, SNAPSHOT_HEADER};
use crate::snapshot::check_header;

/// Contract between a shop adapter and the cleaning pipeline
pub trait RecordSource: Send + Sync {
    /// Identifier used in logs and errors
    fn name(&self) -> &str;

    /// All listings currently available from this source.
    /// An empty vector is a normal outcome.
    fn fetch(&self) -> Result<Vec<RawRecord>>;
}

/// Raw scrape export on disk, laid out like the snapshot.
///
/// Exports written in append mode repeat the header before every batch;
/// those repeated header rows are skipped.
pub struct CsvRecordSource {
    name: String,
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            path,
        }
    }
}

impl RecordSource for CsvRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        check_header(reader.headers()?)?;

        let mut records = Vec::new();
        let mut repeated_headers = 0;
        for row in reader.records() {
            let row = row?;
            if row.iter().eq(SNAPSHOT_HEADER.iter().copied()) {
                repeated_headers += 1;
                continue;
            }
            records.push(RawRecord::from_row(&row));
        }

        if repeated_headers > 0 {
            debug!("{}: skipped {} repeated header rows", self.name, repeated_headers);
        }
        info!("Read {} raw listings from {}", records.len(), self.name);
        Ok(records)
    }
}

/// Fetches every source concurrently and concatenates their listings.
///
/// Each fetch runs on the blocking pool; results are joined in registration
/// order. The first failing source aborts the collection.
pub async fn collect_sources(sources: Vec<Arc<dyn RecordSource>>) -> Result<Vec<RawRecord>> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let name = source.name().to_string();
            let handle = tokio::task::spawn_blocking(move || source.fetch());
            (name, handle)
        })
        .collect();

    let mut all = Vec::new();
    for (name, handle) in handles {
        let records = handle.await.map_err(|e| PriceError::SourceTask {
            source_name: name.clone(),
            reason: e.to_string(),
        })??;
        debug!("Source {} yielded {} listings", name, records.len());
        all.extend(records);
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Nom,Prix,Site web,Catégorie,Date de collecte,Promotions";

    struct FixedSource {
        site: &'static str,
        count: usize,
    }

    impl RecordSource for FixedSource {
        fn name(&self) -> &str {
            self.site
        }

        fn fetch(&self) -> Result<Vec<RawRecord>> {
            Ok((0..self.count)
                .map(|i| RawRecord {
                    name: format!("Produit {i}"),
                    price_text: "100.00 MAD".to_string(),
                    site: self.site.to_string(),
                    ..Default::default()
                })
                .collect())
        }
    }

    struct BrokenSource;

    impl RecordSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch(&self) -> Result<Vec<RawRecord>> {
            Err(PriceError::Io(std::io::Error::other("connection reset")))
        }
    }

    fn raw_export(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn csv_source_skips_repeated_headers() {
        let file = raw_export(&format!(
            "{HEADER}\nHP 250 G8,4200 MAD,Jumia.ma,Laptops,2025-03-07,Aucune\n{HEADER}\nDell,5100 MAD,UltraPC.ma,Laptops,2025-03-08,Aucune\n"
        ));
        let records = CsvRecordSource::new(file.path()).fetch().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "HP 250 G8");
        assert_eq!(records[1].site, "UltraPC.ma");
    }

    #[test]
    fn csv_source_rejects_foreign_header() {
        let file = raw_export("name,price\nHP,100\n");
        let result = CsvRecordSource::new(file.path()).fetch();
        assert!(matches!(result, Err(PriceError::SchemaMismatch { .. })));
    }

    #[test]
    fn csv_source_missing_file_is_error() {
        let result = CsvRecordSource::new("/this/file/does/not/exist.csv").fetch();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn collects_all_sources_in_order() {
        let sources: Vec<Arc<dyn RecordSource>> = vec![
            Arc::new(FixedSource { site: "Jumia.ma", count: 3 }),
            Arc::new(FixedSource { site: "UltraPC.ma", count: 0 }),
            Arc::new(FixedSource { site: "SetupGame.ma", count: 2 }),
        ];

        let records = collect_sources(sources).await.unwrap();
        let sites: Vec<_> = records.iter().map(|r| r.site.as_str()).collect();
        assert_eq!(
            sites,
            vec!["Jumia.ma", "Jumia.ma", "Jumia.ma", "SetupGame.ma", "SetupGame.ma"]
        );
    }

    #[tokio::test]
    async fn failing_source_aborts_collection() {
        let sources: Vec<Arc<dyn RecordSource>> = vec![
            Arc::new(FixedSource { site: "Jumia.ma", count: 1 }),
            Arc::new(BrokenSource),
        ];
        assert!(collect_sources(sources).await.is_err());
    }
}
