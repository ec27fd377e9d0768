//! Unit tests for snapshot queries.

use super::*;
use crate::dedup::deduplicate;

fn listing(
    name: &str,
    site: &str,
    category: &str,
    price: Option<f64>,
    promotion: &str,
    day: Option<u32>,
) -> NormalizedRecord {
    NormalizedRecord {
        name: name.to_string(),
        price,
        price_raw: String::new(),
        site: site.to_string(),
        category: category.to_string(),
        collected_at: day.and_then(|d| NaiveDate::from_ymd_opt(2025, 3, d)),
        collected_at_raw: String::new(),
        promotion_amount: crate::cleaning::parse_promotion(promotion),
        promotion_raw: promotion.to_string(),
    }
}

fn engine(records: Vec<NormalizedRecord>) -> QueryEngine {
    QueryEngine::new(Arc::new(deduplicate(records)))
}

fn laptops() -> QueryEngine {
    engine(vec![
        listing("LENOVO V15", "siteA", "Laptops", Some(4200.0), "Aucune", Some(7)),
        listing("Lenovo V15 Pro", "siteB", "Laptops", Some(5100.0), "Aucune", Some(7)),
        listing("LENOVO V15", "siteC", "Laptops", Some(3990.0), "Aucune", Some(7)),
    ])
}

mod lowest_price_tests {
    use super::*;

    #[test]
    fn picks_minimum_over_case_insensitive_matches() {
        let found = laptops().lowest_price("lenovo v15").unwrap().unwrap();
        assert_eq!(
            found,
            LowestPrice {
                name: "LENOVO V15".to_string(),
                site: "siteC".to_string(),
                price: 3990.0,
            }
        );
    }

    #[test]
    fn unknown_product_is_not_found() {
        assert_eq!(laptops().lowest_price("nonexistent-model-xyz"), Ok(None));
    }

    #[test]
    fn matches_without_price_are_not_found() {
        let engine = engine(vec![listing("HP 250 G8", "siteA", "Laptops", None, "", None)]);
        assert_eq!(engine.lowest_price("HP"), Ok(None));
    }

    #[test]
    fn unpriced_match_does_not_hide_priced_one() {
        let engine = engine(vec![
            listing("HP 250 G8", "siteA", "Laptops", None, "", Some(7)),
            listing("HP 250 G8", "siteB", "Laptops", Some(4500.0), "", Some(7)),
        ]);
        let found = engine.lowest_price("hp 250").unwrap().unwrap();
        assert_eq!(found.site, "siteB");
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(
            laptops().lowest_price(""),
            Err(QueryError::MissingParameter("product"))
        );
        assert_eq!(
            laptops().lowest_price("  "),
            Err(QueryError::MissingParameter("product"))
        );
    }

    #[test]
    fn tie_keeps_first_in_snapshot_order() {
        let engine = engine(vec![
            listing("Dell Vostro", "siteB", "Laptops", Some(5000.0), "", Some(7)),
            listing("Dell Vostro", "siteA", "Laptops", Some(5000.0), "", Some(7)),
        ]);
        let found = engine.lowest_price("dell").unwrap().unwrap();
        assert_eq!(found.site, "siteA");
    }
}

mod promotions_tests {
    use super::*;

    fn promoted() -> QueryEngine {
        engine(vec![
            listing("Souris M185", "Jumia.ma", "Accessoires", Some(99.0), "-20.00 MAD", Some(7)),
            listing("HP 250 G8", "SetupGame.ma", "Laptops", Some(4200.0), "-300.00 MAD", Some(7)),
            listing("Dell Vostro", "Jumia.ma", "Laptops", Some(5100.0), "Aucune", Some(7)),
            listing("Clavier K120", "Jumia.ma", "Claviers", Some(120.0), "", Some(7)),
            listing("Asus TUF", "UltraPC.ma", "Laptops", None, "-1,000.00 MAD", None),
        ])
    }

    #[test]
    fn only_promoted_rows_are_listed() {
        let grouped = promoted().promotions_by_category();
        let names: Vec<_> = grouped
            .values()
            .flatten()
            .map(|summary| summary.name.as_str())
            .collect();
        assert_eq!(names, vec!["Souris M185", "Asus TUF", "HP 250 G8"]);
    }

    #[test]
    fn categories_without_promotions_are_absent() {
        let grouped = promoted().promotions_by_category();
        assert_eq!(
            grouped.keys().collect::<Vec<_>>(),
            vec!["Accessoires", "Laptops"]
        );
        assert!(!grouped.contains_key("Claviers"));
    }

    #[test]
    fn summary_carries_display_fields() {
        let grouped = promoted().promotions_by_category();
        let laptops = &grouped["Laptops"];

        assert_eq!(laptops[0].name, "Asus TUF");
        assert_eq!(laptops[0].price, None);
        assert_eq!(laptops[0].collected_at, None);
        assert_eq!(laptops[1].promotion, "-300.00 MAD");
        assert_eq!(laptops[1].collected_at.as_deref(), Some("2025-03-07"));
    }

    #[test]
    fn empty_snapshot_has_no_promotions() {
        assert!(engine(Vec::new()).promotions_by_category().is_empty());
    }

    #[test]
    fn counts_promotions_per_category() {
        let counts = promoted().promotion_counts();
        assert_eq!(counts.get("Laptops"), Some(&2));
        assert_eq!(counts.get("Accessoires"), Some(&1));
        assert_eq!(counts.get("Claviers"), None);
    }

    #[test]
    fn summary_serializes_with_snapshot_labels() {
        let grouped = promoted().promotions_by_category();
        let json = serde_json::to_string(&grouped["Accessoires"][0]).unwrap();
        assert!(json.contains("\"Nom\":\"Souris M185\""));
        assert!(json.contains("\"Site web\":\"Jumia.ma\""));
        assert!(json.contains("\"Date de collecte\":\"2025-03-07\""));
    }
}

mod comparison_tests {
    use super::*;

    fn multi_site() -> QueryEngine {
        engine(vec![
            listing("HP 250 G8", "Jumia.ma", "Laptops", Some(4200.0), "", Some(7)),
            listing("HP 250 G8", "Jumia.ma", "Laptops", Some(4100.0), "", Some(8)),
            listing("HP 250 G8", "UltraPC.ma", "Laptops", Some(4300.0), "", Some(7)),
            listing("Dell Vostro", "Jumia.ma", "Laptops", Some(5100.0), "", Some(7)),
            listing("Dell Vostro", "UltraPC.ma", "Laptops", None, "", Some(7)),
        ])
    }

    #[test]
    fn keeps_products_on_enough_sites() {
        let comparison = multi_site().compare_prices(2);
        assert_eq!(comparison.len(), 1);
        assert_eq!(comparison[0].name, "HP 250 G8");
        assert_eq!(comparison[0].prices.get("Jumia.ma"), Some(&4100.0));
        assert_eq!(comparison[0].prices.get("UltraPC.ma"), Some(&4300.0));
    }

    #[test]
    fn single_site_threshold_lists_every_priced_product() {
        let names: Vec<_> = multi_site()
            .compare_prices(1)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Dell Vostro", "HP 250 G8"]);
    }

    #[test]
    fn history_is_ordered_by_date() {
        let history = multi_site().price_history("hp 250 g8").unwrap();
        let prices: Vec<_> = history.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![4200.0, 4300.0, 4100.0]);
        assert_eq!(history[0].site, "Jumia.ma");
        assert_eq!(history[1].site, "UltraPC.ma");
    }

    #[test]
    fn history_requires_product() {
        assert_eq!(
            multi_site().price_history(""),
            Err(QueryError::MissingParameter("product"))
        );
    }
}
