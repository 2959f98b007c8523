//! # Dashboard and Search
//!
//! Read-only views computed from the store; nothing here touches the
//! database.

use serde::Serialize;
use ts_rs::TS;

use hpp_core::catalog::{
    filter_materials, filter_products, group_by_category, summarize, CatalogSummary,
};
use hpp_core::{Material, Product};

use crate::state::CatalogStore;

/// Materials of one category, for the BoM material picker.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPickerGroup {
    pub category_name: String,
    pub materials: Vec<Material>,
}

/// Counts, averages and the most recent products.
pub async fn dashboard_summary(store: &CatalogStore) -> CatalogSummary {
    let categories = store.categories().await;
    let materials = store.materials().await;
    let products = store.products().await;

    summarize(&categories, &materials, &products)
}

/// Products whose name contains `query`, case-insensitively.
pub async fn search_products(store: &CatalogStore, query: &str) -> Vec<Product> {
    let products = store.products().await;
    filter_products(&products, query).into_iter().cloned().collect()
}

/// Materials whose name or category name contains `query`.
pub async fn search_materials(store: &CatalogStore, query: &str) -> Vec<Material> {
    let materials = store.materials().await;
    filter_materials(&materials, query).into_iter().cloned().collect()
}

pub async fn material_picker(store: &CatalogStore) -> Vec<MaterialPickerGroup> {
    let materials = store.materials().await;
    group_by_category(&materials)
        .into_iter()
        .map(|group| MaterialPickerGroup {
            category_name: group.category_name,
            materials: group.materials.into_iter().cloned().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::product::{new_product_editor, save_product};
    use super::super::test_support::{category, fixture, material};
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_empty_summary() {
        let fx = fixture().await;
        let summary = dashboard_summary(&fx.store).await;
        assert_eq!(summary.product_count, 0);
        assert_eq!(summary.average_production_cost, 0.0);
        assert!(summary.recent_products.is_empty());
    }

    #[tokio::test]
    async fn test_summary_and_search() {
        let fx = fixture().await;
        let kain = category(&fx, "Kain").await;
        let aks = category(&fx, "Aksesoris").await;
        let katun = material(&fx, &kain.id, "Katun", "10000").await;
        material(&fx, &aks.id, "Kancing", "500").await;

        for name in ["Tas Tote", "Dompet"] {
            let mut editor = new_product_editor(&AppConfig::default());
            editor.set_name(name);
            let line = editor.add_line();
            editor.select_material(line, &katun);
            editor.set_quantity(line, 2.0);
            save_product(&fx.db, &fx.store, &editor).await.unwrap();
        }

        let summary = dashboard_summary(&fx.store).await;
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.material_count, 2);
        assert_eq!(summary.category_count, 2);
        assert_eq!(summary.average_production_cost, 25_000.0);
        assert_eq!(summary.recent_products.len(), 2);

        let found = search_products(&fx.store, "tas").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Tas Tote");

        let by_category = search_materials(&fx.store, "aksesoris").await;
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].name, "Kancing");

        let groups = material_picker(&fx.store).await;
        let names: Vec<&str> = groups.iter().map(|g| g.category_name.as_str()).collect();
        assert!(names.contains(&"Kain"));
        assert!(names.contains(&"Aksesoris"));
    }
}
