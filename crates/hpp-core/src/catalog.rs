//! # Catalog Helpers
//!
//! Read-only views over the loaded collections: the dashboard summary,
//! search filters and the material picker grouping.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Category, Material, Product};

/// How many products the dashboard lists as recent.
pub const RECENT_PRODUCT_LIMIT: usize = 5;

/// Group label for materials whose category name is unknown.
pub const UNCATEGORIZED: &str = "Uncategorized";

// =============================================================================
// Dashboard Summary
// =============================================================================

/// A product line on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentProduct {
    pub id: String,
    pub name: String,
    pub production_cost: Money,
    pub estimated_selling_price: Money,
}

/// Counts and averages shown on the dashboard.
///
/// Averages are plain means of the stored whole-Rupiah figures and are 0
/// when there are no products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogSummary {
    pub product_count: usize,
    pub material_count: usize,
    pub category_count: usize,
    pub average_production_cost: f64,
    pub average_selling_price: f64,
    pub average_gross_profit: f64,
    pub recent_products: Vec<RecentProduct>,
}

fn average(products: &[Product], figure: impl Fn(&Product) -> Money) -> f64 {
    if products.is_empty() {
        return 0.0;
    }
    let total: Money = products.iter().map(figure).sum();
    total.as_f64() / products.len() as f64
}

pub fn summarize(
    categories: &[Category],
    materials: &[Material],
    products: &[Product],
) -> CatalogSummary {
    let mut newest: Vec<&Product> = products.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    CatalogSummary {
        product_count: products.len(),
        material_count: materials.len(),
        category_count: categories.len(),
        average_production_cost: average(products, |p| p.costing.production_cost),
        average_selling_price: average(products, |p| p.costing.estimated_selling_price),
        average_gross_profit: average(products, |p| p.costing.gross_profit_per_unit),
        recent_products: newest
            .into_iter()
            .take(RECENT_PRODUCT_LIMIT)
            .map(|p| RecentProduct {
                id: p.id.clone(),
                name: p.name.clone(),
                production_cost: p.costing.production_cost,
                estimated_selling_price: p.costing.estimated_selling_price,
            })
            .collect(),
    }
}

// =============================================================================
// Search
// =============================================================================

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Products whose name contains `query` (case-insensitive). An empty query
/// matches everything.
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| contains_ignore_case(&p.name, &needle))
        .collect()
}

/// Materials whose name or category name contains `query`.
pub fn filter_materials<'a>(materials: &'a [Material], query: &str) -> Vec<&'a Material> {
    let needle = query.trim().to_lowercase();
    materials
        .iter()
        .filter(|m| {
            contains_ignore_case(&m.name, &needle)
                || m.category_name
                    .as_deref()
                    .is_some_and(|c| contains_ignore_case(c, &needle))
        })
        .collect()
}

// =============================================================================
// Material Picker Grouping
// =============================================================================

/// Materials sharing one category, for a grouped picker.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup<'a> {
    pub category_name: String,
    pub materials: Vec<&'a Material>,
}

/// Groups materials by category name, keeping first-seen order for both
/// groups and members.
pub fn group_by_category(materials: &[Material]) -> Vec<MaterialGroup<'_>> {
    let mut groups: Vec<MaterialGroup<'_>> = Vec::new();

    for material in materials {
        let name = material.category_name.as_deref().unwrap_or(UNCATEGORIZED);
        match groups.iter_mut().find(|g| g.category_name == name) {
            Some(group) => group.materials.push(material),
            None => groups.push(MaterialGroup {
                category_name: name.to_string(),
                materials: vec![material],
            }),
        }
    }

    groups
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::CostBreakdown;
    use crate::types::Unit;
    use chrono::{Duration, Utc};

    fn product(id: &str, name: &str, production: i64, selling: i64, age_days: i64) -> Product {
        let created = Utc::now() - Duration::days(age_days);
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            overhead_percentage: 20.0,
            target_margin_percentage: 30.0,
            costing: CostBreakdown {
                total_material_cost: Money::zero(),
                production_cost: Money::from_rupiah(production),
                estimated_selling_price: Money::from_rupiah(selling),
                gross_profit_per_unit: Money::from_rupiah(selling - production),
            },
            bom: vec![],
            photos: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    fn material(id: &str, name: &str, category: Option<&str>) -> Material {
        let now = Utc::now();
        Material {
            id: id.to_string(),
            name: name.to_string(),
            category_id: "c".to_string(),
            category_name: category.map(str::to_string),
            standard_price: 1_000.0,
            unit: Unit::Pcs,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = summarize(&[], &[], &[]);
        assert_eq!(summary.product_count, 0);
        assert_eq!(summary.average_production_cost, 0.0);
        assert_eq!(summary.average_gross_profit, 0.0);
        assert!(summary.recent_products.is_empty());
    }

    #[test]
    fn test_summary_averages_and_recent() {
        let products: Vec<Product> = (0..7)
            .map(|i| product(&format!("p{}", i), "x", 1_000 * (i + 1), 2_000 * (i + 1), i))
            .collect();

        let summary = summarize(&[], &[], &products);
        assert_eq!(summary.product_count, 7);
        assert_eq!(summary.average_production_cost, 4_000.0);
        assert_eq!(summary.average_selling_price, 8_000.0);
        assert_eq!(summary.average_gross_profit, 4_000.0);
        assert_eq!(summary.recent_products.len(), RECENT_PRODUCT_LIMIT);
        assert_eq!(summary.recent_products[0].id, "p0");
        assert_eq!(summary.recent_products[4].id, "p4");
    }

    #[test]
    fn test_filters() {
        let products = vec![
            product("1", "Tas Kain", 1, 2, 0),
            product("2", "Dompet Kulit", 1, 2, 0),
        ];
        assert_eq!(filter_products(&products, "KAIN").len(), 1);
        assert_eq!(filter_products(&products, "").len(), 2);

        let materials = vec![
            material("1", "Katun", Some("Kain")),
            material("2", "Resleting", Some("Aksesoris")),
            material("3", "Benang Merah", None),
        ];
        let hits = filter_materials(&materials, "kain");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
        assert_eq!(filter_materials(&materials, "merah")[0].id, "3");
    }

    #[test]
    fn test_group_by_category() {
        let materials = vec![
            material("1", "Katun", Some("Kain")),
            material("2", "Resleting", Some("Aksesoris")),
            material("3", "Linen", Some("Kain")),
            material("4", "Lain", None),
        ];

        let groups = group_by_category(&materials);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category_name, "Kain");
        assert_eq!(groups[0].materials.len(), 2);
        assert_eq!(groups[2].category_name, UNCATEGORIZED);
    }
}
