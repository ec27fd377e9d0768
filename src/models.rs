use chrono::NaiveDate;

/// Labels of the six snapshot columns, in file order.
pub const SNAPSHOT_HEADER: [&str; 6] = [
    "Nom",
    "Prix",
    "Site web",
    "Catégorie",
    "Date de collecte",
    "Promotions",
];

/// One listing as produced by a source adapter. Nothing is validated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    pub price_text: String,
    pub site: String,
    pub category: String,
    pub collected_at: String,
    pub promotion_text: String,
}

impl RawRecord {
    /// Builds a record from a row laid out like [`SNAPSHOT_HEADER`].
    /// Missing trailing columns become empty strings.
    pub fn from_row(row: &csv::StringRecord) -> Self {
        let field = |i: usize| row.get(i).unwrap_or("").to_string();
        Self {
            name: field(0),
            price_text: field(1),
            site: field(2),
            category: field(3),
            collected_at: field(4),
            promotion_text: field(5),
        }
    }
}

/// A cleaned listing ready for deduplication.
///
/// `name` is canonical and never empty, `site` is never empty. The raw texts
/// are kept next to the parsed values so a failed parse can still be
/// displayed and diagnosed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub name: String,
    pub price: Option<f64>,
    pub price_raw: String,
    pub site: String,
    pub category: String,
    pub collected_at: Option<NaiveDate>,
    pub collected_at_raw: String,
    pub promotion_amount: f64,
    pub promotion_raw: String,
}

impl NormalizedRecord {
    /// Identity used to detect repeated observations of the same listing.
    pub fn key(&self) -> DedupKey {
        DedupKey {
            name: self.name.clone(),
            collected_at: self.collected_at,
            site: self.site.clone(),
        }
    }

    pub fn has_promotion(&self) -> bool {
        self.promotion_amount != 0.0
    }

    /// Price column text: `"<amount> MAD"` when known, else the source text.
    pub fn price_display(&self) -> String {
        match self.price {
            Some(price) => format!("{price:.2} MAD"),
            None => self.price_raw.clone(),
        }
    }

    /// Date column text: ISO date when parsed, else the source text.
    pub fn collected_at_display(&self) -> String {
        match self.collected_at {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self.collected_at_raw.clone(),
        }
    }
}

/// Composite identity `(name, collected_at, site)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub name: String,
    pub collected_at: Option<NaiveDate>,
    pub site: String,
}
