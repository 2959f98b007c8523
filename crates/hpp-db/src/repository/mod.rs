//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Workbench action                                                      │
//! │       │                                                                 │
//! │       │  db.materials().delete(id)                                     │
//! │       ▼                                                                 │
//! │  MaterialRepository                                                    │
//! │  ├── list / list_by_category / get_by_id                               │
//! │  ├── insert / update                                                   │
//! │  └── count_bom_lines / delete (guarded)                                │
//! │       │                                                                 │
//! │       │  SQL (inside a transaction where a guard is involved)          │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`MaterialRepository`](material::MaterialRepository) - Material CRUD
//! - [`ProductRepository`](product::ProductRepository) - Products with BoM lines
//! - [`PhotoRepository`](photo::PhotoRepository) - Product photo gallery

use uuid::Uuid;

pub mod category;
pub mod material;
pub mod photo;
pub mod product;

/// Generates a new row id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shared fixtures for repository tests.
#[cfg(test)]
pub(crate) mod test_support {
    use hpp_core::{Category, Material, MaterialInput, Unit};

    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn category(db: &Database, name: &str) -> Category {
        db.categories().insert(name).await.unwrap()
    }

    pub async fn material(db: &Database, category_id: &str, name: &str, price: f64) -> Material {
        db.materials()
            .insert(&MaterialInput {
                name: name.to_string(),
                category_id: category_id.to_string(),
                standard_price: price,
                unit: Unit::Pcs,
            })
            .await
            .unwrap()
    }
}
