//! # hpp-db: Database Layer for HPP Workbench
//!
//! This crate provides persistence for the workbench: SQLite (via sqlx) for
//! categories, materials, products and their BoM lines, and a filesystem
//! store for product photos.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HPP Workbench Data Flow                          │
//! │                                                                         │
//! │  Workbench action (create_product)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hpp-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ CategoryRepo   │   │  (embedded)  │  │   │
//! │  │   │               │◄───│ MaterialRepo   │   │ 001_init.sql │  │   │
//! │  │   │  SqlitePool   │    │ ProductRepo    │   │ 002_photos   │  │   │
//! │  │   └───────────────┘    │ PhotoRepo      │   └──────────────┘  │   │
//! │  │                        └────────────────┘                      │   │
//! │  │   ┌──────────────────────────────────┐                         │   │
//! │  │   │ PhotoStorage / LocalPhotoStorage │  (storage.rs)           │   │
//! │  │   └──────────────────────────────────┘                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file + photo directory                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hpp_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/hpp.db")).await?;
//! let category = db.categories().insert("Kain").await?;
//! let products = db.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use storage::{LocalPhotoStorage, PhotoStorage};

pub use repository::category::CategoryRepository;
pub use repository::material::MaterialRepository;
pub use repository::photo::PhotoRepository;
pub use repository::product::ProductRepository;
