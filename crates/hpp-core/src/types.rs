//! # Domain Types
//!
//! Core domain types used throughout the workbench.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Material     │◄──│  BomLineDetail  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  material_id    │       │
//! │  │  name (unique)  │   │  category_id    │   │  price snapshot │       │
//! │  └─────────────────┘   │  standard_price │   │  quantity       │       │
//! │                        │  unit (Pcs/Cm)  │   └────────┬────────┘       │
//! │                        └─────────────────┘            │                │
//! │                                                       ▼                │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │  ProductPhoto   │──►│               Product                   │     │
//! │  │  display_order  │   │  overhead %, target margin %            │     │
//! │  └─────────────────┘   │  costing: CostBreakdown (derived cache) │     │
//! │                        └─────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ephemeral vs Persisted BoM Lines
//! - [`BomLine`]: what a product form holds while the user edits it
//! - [`BomLineDetail`]: a saved line, with subtotal and the joined material

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::costing::{self, CostBreakdown, PricedLine};

// =============================================================================
// Unit
// =============================================================================

/// Measurement unit of a material.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Unit {
    /// Counted pieces.
    #[default]
    Pcs,
    /// Length in centimetres.
    Cm,
}

impl Unit {
    pub const ALL: [Unit; 2] = [Unit::Pcs, Unit::Cm];

    /// Stored and displayed code (`Pcs`, `Cm`).
    pub fn code(&self) -> &'static str {
        match self {
            Unit::Pcs => "Pcs",
            Unit::Cm => "Cm",
        }
    }

    /// Label for unit pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Pcs => "Pcs (Pieces)",
            Unit::Cm => "Cm (Centimeter)",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pcs" => Ok(Unit::Pcs),
            "cm" => Ok(Unit::Cm),
            other => Err(format!("unknown unit: {}", other)),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A grouping of materials (e.g. "Kain", "Benang").
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Material
// =============================================================================

/// A raw material in the catalog.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category_id: String,
    /// Denormalized category name for display (joined on read).
    pub category_name: Option<String>,
    /// Standard unit price in Rupiah, used as the default BoM line price.
    pub standard_price: f64,
    pub unit: Unit,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Validated material fields, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialInput {
    pub name: String,
    pub category_id: String,
    pub standard_price: f64,
    pub unit: Unit,
}

// =============================================================================
// Bill of Materials
// =============================================================================

/// One line of a product's BoM while the product is being edited.
///
/// `price` is a snapshot of the material's standard price at the time the
/// material was picked; the user may edit it independently afterwards.
/// An empty `material_id` means no material has been picked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BomLine {
    pub material_id: String,
    pub price: f64,
    pub quantity: f64,
}

impl BomLine {
    pub fn new(material_id: impl Into<String>, price: f64, quantity: f64) -> Self {
        BomLine {
            material_id: material_id.into(),
            price,
            quantity,
        }
    }

    /// A line with nothing picked yet (price 0, quantity 1).
    pub fn blank() -> Self {
        BomLine::new("", 0.0, 1.0)
    }

    /// Picks `material`, snapshotting its standard price.
    pub fn from_material(material: &Material, quantity: f64) -> Self {
        BomLine::new(material.id.clone(), material.standard_price, quantity)
    }

    pub fn has_material(&self) -> bool {
        !self.material_id.trim().is_empty()
    }

    /// `price * quantity`.
    pub fn subtotal(&self) -> f64 {
        costing::subtotal(self.price, self.quantity)
    }
}

impl PricedLine for BomLine {
    fn price(&self) -> f64 {
        self.price
    }

    fn quantity(&self) -> f64 {
        self.quantity
    }
}

/// A persisted BoM line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BomLineDetail {
    pub id: String,
    pub product_id: String,
    pub material_id: String,
    pub price: f64,
    pub quantity: f64,
    /// `price * quantity`, stored alongside the line.
    pub subtotal: f64,
    /// The referenced material, joined with its category name.
    pub material: Option<Material>,
}

impl BomLineDetail {
    /// Converts back into an editable line.
    pub fn to_bom_line(&self) -> BomLine {
        BomLine::new(self.material_id.clone(), self.price, self.quantity)
    }
}

impl PricedLine for BomLineDetail {
    fn price(&self) -> f64 {
        self.price
    }

    fn quantity(&self) -> f64 {
        self.quantity
    }
}

// =============================================================================
// Product Photo
// =============================================================================

/// A photo attached to a product, ordered by `display_order`.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPhoto {
    pub id: String,
    pub product_id: String,
    pub photo_url: String,
    /// Position in the gallery; contiguous from 0 within a product.
    pub display_order: i64,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A photo to attach, after it has been uploaded to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPhoto {
    pub photo_url: String,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product composed from a bill of materials.
///
/// ## Derived Costing
/// `costing` is a cache of `compute_all(bom, overhead, margin)`. It is never
/// edited on its own; [`Product::has_consistent_costing`] detects drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub overhead_percentage: f64,
    pub target_margin_percentage: f64,
    #[serde(flatten)]
    #[ts(flatten)]
    pub costing: CostBreakdown,
    pub bom: Vec<BomLineDetail>,
    pub photos: Vec<ProductPhoto>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Editable copies of the saved BoM lines, in saved order.
    pub fn bom_lines(&self) -> Vec<BomLine> {
        self.bom.iter().map(BomLineDetail::to_bom_line).collect()
    }

    /// Recomputes the costing from the saved BoM and percentages.
    pub fn recompute(&self) -> CostBreakdown {
        costing::compute_all(
            &self.bom,
            self.overhead_percentage,
            self.target_margin_percentage,
        )
    }

    /// Whether the cached costing still equals a fresh computation.
    pub fn has_consistent_costing(&self) -> bool {
        self.recompute() == self.costing
    }

    /// First photo by display order, used as the cover image.
    pub fn cover_photo(&self) -> Option<&ProductPhoto> {
        self.photos.iter().min_by_key(|p| p.display_order)
    }
}

/// Validated product fields plus BoM, ready to insert or update.
///
/// The persistence layer stores `draft.costing()` as the product's derived
/// fields, so what is displayed and what is saved come from the same call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub overhead_percentage: f64,
    pub target_margin_percentage: f64,
    pub bom: Vec<BomLine>,
}

impl ProductDraft {
    pub fn costing(&self) -> CostBreakdown {
        costing::compute_all(
            &self.bom,
            self.overhead_percentage,
            self.target_margin_percentage,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn material(id: &str, price: f64) -> Material {
        let now = Utc::now();
        Material {
            id: id.to_string(),
            name: format!("Material {}", id),
            category_id: "cat-1".to_string(),
            category_name: Some("Kain".to_string()),
            standard_price: price,
            unit: Unit::Cm,
            created_at: now,
            updated_at: now,
        }
    }

    fn saved_line(material_id: &str, price: f64, quantity: f64) -> BomLineDetail {
        BomLineDetail {
            id: format!("line-{}", material_id),
            product_id: "prod-1".to_string(),
            material_id: material_id.to_string(),
            price,
            quantity,
            subtotal: price * quantity,
            material: None,
        }
    }

    #[test]
    fn test_unit_parse_and_display() {
        assert_eq!("Pcs".parse::<Unit>().unwrap(), Unit::Pcs);
        assert_eq!(" cm ".parse::<Unit>().unwrap(), Unit::Cm);
        assert!("kg".parse::<Unit>().is_err());
        assert_eq!(Unit::Cm.to_string(), "Cm");
        assert_eq!(Unit::Pcs.label(), "Pcs (Pieces)");
    }

    #[test]
    fn test_bom_line_snapshots_material_price() {
        let kain = material("kain", 12_500.0);
        let line = BomLine::from_material(&kain, 2.5);

        assert_eq!(line.material_id, "kain");
        assert_eq!(line.price, 12_500.0);
        assert_eq!(line.subtotal(), 31_250.0);
        assert!(line.has_material());
        assert!(!BomLine::blank().has_material());
    }

    #[test]
    fn test_product_costing_consistency() {
        let now = Utc::now();
        let mut product = Product {
            id: "prod-1".to_string(),
            name: "Tas Kain".to_string(),
            description: None,
            overhead_percentage: 20.0,
            target_margin_percentage: 30.0,
            costing: CostBreakdown::default(),
            bom: vec![saved_line("a", 10_000.0, 2.0), saved_line("b", 5_000.0, 1.0)],
            photos: vec![],
            created_at: now,
            updated_at: now,
        };
        assert!(!product.has_consistent_costing());

        product.costing = product.recompute();
        assert!(product.has_consistent_costing());
        assert_eq!(product.costing.estimated_selling_price, Money::from_rupiah(44_643));
        assert_eq!(product.bom_lines()[0], BomLine::new("a", 10_000.0, 2.0));
    }

    #[test]
    fn test_product_serializes_costing_flat() {
        let now = Utc::now();
        let draft = ProductDraft {
            name: "Tas".to_string(),
            description: None,
            overhead_percentage: 20.0,
            target_margin_percentage: 30.0,
            bom: vec![BomLine::new("a", 10_000.0, 2.0), BomLine::new("b", 5_000.0, 1.0)],
        };
        let product = Product {
            id: "p".to_string(),
            name: draft.name.clone(),
            description: None,
            overhead_percentage: 20.0,
            target_margin_percentage: 30.0,
            costing: draft.costing(),
            bom: vec![],
            photos: vec![],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["production_cost"], 31_250);
        assert_eq!(json["gross_profit_per_unit"], 13_393);
    }
}
