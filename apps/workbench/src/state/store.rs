//! # Catalog Store
//!
//! In-memory copy of the catalog that actions keep in step with the database.
//!
//! ## Thread Safety
//! Each collection sits behind its own `tokio::sync::RwLock`, so loading
//! materials never blocks a reader of categories. Readers get clones.
//!
//! ## Store Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Operations                                     │
//! │                                                                         │
//! │  Action                    Database                 Store Change        │
//! │  ──────                    ────────                 ────────────        │
//! │                                                                         │
//! │  fetch_materials() ──────► list() ────────────────► replace all        │
//! │                                                                         │
//! │  create_material() ──────► insert() ──────────────► upsert one         │
//! │                                                                         │
//! │  update_material() ──────► update() ──────────────► upsert one         │
//! │                                                                         │
//! │  delete_material() ──────► delete() ──────────────► remove one         │
//! │                                                                         │
//! │  Any failure ──────────────────────────────────────► last_error = msg  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tokio::sync::RwLock;
use ts_rs::TS;

use hpp_core::validation::Named;
use hpp_core::{Category, Material, Product};

// =============================================================================
// Connection Status
// =============================================================================

/// Whether the database answered the last health check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Connected,
    Error { message: String },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

// =============================================================================
// Collection
// =============================================================================

/// One entity list with its loading flag and last error.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// Set once a fetch has succeeded.
    pub loaded: bool,
    pub last_error: Option<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            items: Vec::new(),
            loading: false,
            loaded: false,
            last_error: None,
        }
    }
}

impl<T: Named + Clone> Collection<T> {
    /// Marks a fetch as started and clears the previous error.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    /// Replaces all items with a fresh fetch.
    pub fn finish_load(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
        self.loaded = true;
    }

    /// Records a failure; items already loaded are kept.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.last_error = Some(message.into());
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replaces the item with the same id, or inserts it.
    ///
    /// New items go first when `newest_first`, otherwise last.
    pub fn upsert(&mut self, item: T, newest_first: bool) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None if newest_first => self.items.insert(0, item),
            None => self.items.push(item),
        }
        self.last_error = None;
    }

    /// Removes the item with `id`; returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Sorts by name, case-insensitively.
    pub fn sort_by_name(&mut self) {
        self.items
            .sort_by_key(|item| item.name().to_lowercase());
    }
}

// =============================================================================
// Catalog Store
// =============================================================================

/// Point-in-time copy of the whole store.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub categories: Collection<Category>,
    pub materials: Collection<Material>,
    pub products: Collection<Product>,
    pub status: ConnectionStatus,
}

/// Shared application state, passed explicitly to every action.
#[derive(Debug, Default)]
pub struct CatalogStore {
    pub(crate) categories: RwLock<Collection<Category>>,
    pub(crate) materials: RwLock<Collection<Material>>,
    pub(crate) products: RwLock<Collection<Product>>,
    status: RwLock<ConnectionStatus>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.categories.read().await.items.clone()
    }

    pub async fn materials(&self) -> Vec<Material> {
        self.materials.read().await.items.clone()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.products.read().await.items.clone()
    }

    pub async fn product(&self, id: &str) -> Option<Product> {
        self.products.read().await.get(id).cloned()
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.status.read().await.clone()
    }

    pub async fn set_status(&self, status: ConnectionStatus) {
        *self.status.write().await = status;
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            categories: self.categories.read().await.clone(),
            materials: self.materials.read().await.clone(),
            products: self.products.read().await.clone(),
            status: self.status().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(id: &str, name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: id.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_load_cycle() {
        let mut collection = Collection::default();
        collection.begin_load();
        assert!(collection.loading);
        assert!(!collection.loaded);

        collection.finish_load(vec![category("1", "Kain")]);
        assert!(!collection.loading);
        assert!(collection.loaded);
        assert_eq!(collection.items.len(), 1);

        collection.begin_load();
        collection.fail("offline");
        assert!(!collection.loading);
        assert_eq!(collection.last_error.as_deref(), Some("offline"));
        assert_eq!(collection.items.len(), 1);
        assert!(collection.loaded);
    }

    #[test]
    fn test_upsert_replaces_or_inserts() {
        let mut collection = Collection::default();
        collection.upsert(category("1", "Kain"), false);
        collection.upsert(category("2", "Benang"), false);
        collection.upsert(category("1", "Kain Katun"), false);

        assert_eq!(collection.items.len(), 2);
        assert_eq!(collection.get("1").map(|c| c.name.as_str()), Some("Kain Katun"));

        collection.upsert(category("3", "Aksesoris"), true);
        assert_eq!(collection.items[0].id, "3");

        collection.sort_by_name();
        let names: Vec<&str> = collection.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Aksesoris", "Benang", "Kain Katun"]);
    }

    #[test]
    fn test_remove() {
        let mut collection = Collection::default();
        collection.upsert(category("1", "Kain"), false);
        assert!(collection.remove("1"));
        assert!(!collection.remove("1"));
        assert!(collection.items.is_empty());
    }

    #[tokio::test]
    async fn test_status_serializes_with_tag() {
        let store = CatalogStore::new();
        assert_eq!(store.status().await, ConnectionStatus::Checking);

        store
            .set_status(ConnectionStatus::Error {
                message: "database is locked".to_string(),
            })
            .await;

        let json = serde_json::to_value(store.snapshot().await).unwrap();
        assert_eq!(json["status"]["state"], "error");
        assert_eq!(json["status"]["message"], "database is locked");
        assert_eq!(json["categories"]["loading"], false);
    }
}
