//! # hpp-core: Pure Costing Logic for HPP Workbench
//!
//! This crate is the **heart** of the workbench. It contains the costing
//! engine and every validation rule as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HPP Workbench Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Workbench (apps/workbench)                      │   │
//! │  │    CatalogStore ──► ProductEditor ──► commands (typed actions)  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hpp-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  costing  │  │validation │  │   forms   │  │  format   │  │   │
//! │  │   │ compute_  │  │ required  │  │ category  │  │  Rupiah   │  │   │
//! │  │   │   all     │  │ unique    │  │ material  │  │  number   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hpp-db (Database Layer)                      │   │
//! │  │         SQLite repositories, migrations, photo storage          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`costing`] - The four-step pipeline: material → HPP → price → profit
//! - [`validation`] - Field checkers and deletion guards
//! - [`forms`] - Per-form validation that yields typed inputs
//! - [`types`] - Domain types (Category, Material, Product, BomLine, ...)
//! - [`money`] - Whole-Rupiah money type
//! - [`format`] - Indonesian number and currency formatting
//! - [`catalog`] - Dashboard summary, search filters, material grouping
//! - [`photos`] - Photo display-order rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use hpp_core::costing::compute_all;
//! use hpp_core::types::BomLine;
//!
//! let bom = vec![
//!     BomLine::new("kain", 10_000.0, 2.0),
//!     BomLine::new("benang", 5_000.0, 1.0),
//! ];
//!
//! let costing = compute_all(&bom, 20.0, 30.0);
//! assert_eq!(costing.total_material_cost.rupiah(), 25_000);
//! assert_eq!(costing.production_cost.rupiah(), 31_250);
//! assert_eq!(costing.estimated_selling_price.rupiah(), 44_643);
//! assert_eq!(costing.gross_profit_per_unit.rupiah(), 13_393);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod costing;
pub mod error;
pub mod format;
pub mod forms;
pub mod money;
pub mod photos;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use costing::{compute_all, CostBreakdown, PricedLine};
pub use error::{CoreError, CoreResult, FieldError, FieldErrors, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Overhead percentage pre-filled for new products and simulations.
pub const DEFAULT_OVERHEAD_PERCENTAGE: f64 = 20.0;

/// Target margin percentage pre-filled for new products and simulations.
pub const DEFAULT_TARGET_MARGIN_PERCENTAGE: f64 = 30.0;

/// Maximum number of photos attached to one product.
pub const MAX_PRODUCT_PHOTOS: usize = 10;

/// Maximum size of a single uploaded photo (5 MiB).
pub const MAX_PHOTO_SIZE_BYTES: u64 = 5 * 1024 * 1024;
