//! Price and promotion queries over a published [`Snapshot`].
//!
//! The engine only reads the snapshot it was built with; it can be shared
//! across threads once constructed.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::NormalizedRecord;
use crate::snapshot::Snapshot;

/// Caller mistakes caught before any matching happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("the \"{0}\" parameter is required")]
    MissingParameter(&'static str),
}

/// Cheapest listing matching a product query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowestPrice {
    #[serde(rename = "Nom")]
    pub name: String,
    #[serde(rename = "Site web")]
    pub site: String,
    #[serde(rename = "Prix")]
    pub price: f64,
}

/// One promoted listing as shown in the promotions overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionSummary {
    #[serde(rename = "Nom")]
    pub name: String,
    #[serde(rename = "Site web")]
    pub site: String,
    #[serde(rename = "Prix")]
    pub price: Option<f64>,
    #[serde(rename = "Promotions")]
    pub promotion: String,
    #[serde(rename = "Date de collecte")]
    pub collected_at: Option<String>,
}

/// Lowest known price of one product on each site that lists it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparison {
    #[serde(rename = "Nom")]
    pub name: String,
    pub prices: BTreeMap<String, f64>,
}

/// A dated price observation of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    #[serde(rename = "Date de collecte")]
    pub date: NaiveDate,
    #[serde(rename = "Site web")]
    pub site: String,
    #[serde(rename = "Prix")]
    pub price: f64,
}

/// Read-only query surface over one snapshot
#[derive(Debug, Clone)]
pub struct QueryEngine {
    snapshot: Arc<Snapshot>,
}

impl QueryEngine {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Cheapest priced listing whose name contains `query` (case-insensitive).
    ///
    /// # Returns
    /// `Ok(None)` when nothing matches or no match has a price, the earliest
    /// listing in snapshot order when several share the minimum.
    pub fn lowest_price(&self, query: &str) -> Result<Option<LowestPrice>, QueryError> {
        let needle = required(query, "product")?.to_lowercase();

        let mut best: Option<(&NormalizedRecord, f64)> = None;
        for record in self.snapshot.iter() {
            let Some(price) = record.price else { continue };
            if !record.name.to_lowercase().contains(&needle) {
                continue;
            }
            if best.map_or(true, |(_, lowest)| price < lowest) {
                best = Some((record, price));
            }
        }

        Ok(best.map(|(record, price)| LowestPrice {
            name: record.name.clone(),
            site: record.site.clone(),
            price,
        }))
    }

    /// Promoted listings grouped by category.
    ///
    /// Categories are ordered by name; each list keeps snapshot order.
    /// Categories without a promoted listing are absent.
    pub fn promotions_by_category(&self) -> BTreeMap<String, Vec<PromotionSummary>> {
        let mut grouped: BTreeMap<String, Vec<PromotionSummary>> = BTreeMap::new();

        for record in self.snapshot.iter().filter(|r| r.has_promotion()) {
            grouped
                .entry(record.category.clone())
                .or_default()
                .push(PromotionSummary {
                    name: record.name.clone(),
                    site: record.site.clone(),
                    price: record.price,
                    promotion: record.promotion_raw.clone(),
                    collected_at: record
                        .collected_at
                        .map(|date| date.format("%Y-%m-%d").to_string()),
                });
        }

        grouped
    }

    /// Number of promoted listings per category.
    pub fn promotion_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in self.snapshot.iter().filter(|r| r.has_promotion()) {
            *counts.entry(record.category.clone()).or_default() += 1;
        }
        counts
    }

    /// Products priced on at least `min_sites` different sites, ordered by name.
    pub fn compare_prices(&self, min_sites: usize) -> Vec<PriceComparison> {
        let mut by_name: BTreeMap<&str, BTreeMap<String, f64>> = BTreeMap::new();

        for record in self.snapshot.iter() {
            let Some(price) = record.price else { continue };
            let sites = by_name.entry(record.name.as_str()).or_default();
            sites
                .entry(record.site.clone())
                .and_modify(|lowest| *lowest = lowest.min(price))
                .or_insert(price);
        }

        by_name
            .into_iter()
            .filter(|(_, prices)| prices.len() >= min_sites.max(1))
            .map(|(name, prices)| PriceComparison {
                name: name.to_string(),
                prices,
            })
            .collect()
    }

    /// Dated prices of the product named exactly `product` (case-insensitive),
    /// ordered by date then site.
    pub fn price_history(&self, product: &str) -> Result<Vec<PricePoint>, QueryError> {
        let wanted = required(product, "product")?.to_lowercase();

        let mut points: Vec<PricePoint> = self
            .snapshot
            .iter()
            .filter(|r| r.name.to_lowercase() == wanted)
            .filter_map(|r| {
                Some(PricePoint {
                    date: r.collected_at?,
                    site: r.site.clone(),
                    price: r.price?,
                })
            })
            .collect();

        points.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.site.cmp(&b.site)));
        Ok(points)
    }
}

fn required<'a>(value: &'a str, parameter: &'static str) -> Result<&'a str, QueryError> {
    if value.trim().is_empty() {
        return Err(QueryError::MissingParameter(parameter));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
