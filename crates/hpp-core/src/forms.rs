//! # Form Validation
//!
//! Turns raw form text into validated inputs, collecting every failed field.
//!
//! ```text
//! ┌──────────────┐   validate_*_form   ┌──────────────────────────────┐
//! │ CategoryForm │ ──────────────────► │ Ok(String)                   │
//! │ MaterialForm │ ──────────────────► │ Ok(MaterialInput)            │
//! │ ProductForm  │ ──────────────────► │ Ok(ProductDraft)             │
//! └──────────────┘          │          └──────────────────────────────┘
//!                           └────────► Err(FieldErrors)  (submission blocked)
//! ```
//!
//! Unlike the single checkers in [`validation`](crate::validation), a form
//! validator keeps going after a failure so every field can show its message.
//! Within one field the checks still stop at the first failure, and the
//! uniqueness check only runs once the name is present.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{FieldErrors, ValidationError};
use crate::types::{BomLine, Category, Material, MaterialInput, Product, ProductDraft, Unit};
use crate::validation::{
    parse_percentage, parse_price, validate_bom, validate_copy_name, validate_required,
    validate_selection, validate_unique_name, Named,
};
use crate::{DEFAULT_OVERHEAD_PERCENTAGE, DEFAULT_TARGET_MARGIN_PERCENTAGE};

// =============================================================================
// Field Keys
// =============================================================================

pub const FIELD_NAME: &str = "name";
pub const FIELD_CATEGORY: &str = "category_id";
pub const FIELD_STANDARD_PRICE: &str = "standard_price";
pub const FIELD_UNIT: &str = "unit";
pub const FIELD_OVERHEAD: &str = "overhead_percentage";
pub const FIELD_MARGIN: &str = "target_margin_percentage";
pub const FIELD_BOM: &str = "bom";

// =============================================================================
// Form Types
// =============================================================================

/// Raw category form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    pub fn from_category(category: &Category) -> Self {
        CategoryForm {
            name: category.name.clone(),
        }
    }
}

/// Raw material form. Numbers and picks are kept as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialForm {
    pub name: String,
    pub category_id: String,
    pub standard_price: String,
    pub unit: String,
}

impl MaterialForm {
    pub fn from_material(material: &Material) -> Self {
        MaterialForm {
            name: material.name.clone(),
            category_id: material.category_id.clone(),
            standard_price: material.standard_price.to_string(),
            unit: material.unit.code().to_string(),
        }
    }
}

/// Raw product header form; BoM lines are edited separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub overhead_percentage: String,
    pub target_margin_percentage: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        ProductForm {
            name: String::new(),
            description: String::new(),
            overhead_percentage: DEFAULT_OVERHEAD_PERCENTAGE.to_string(),
            target_margin_percentage: DEFAULT_TARGET_MARGIN_PERCENTAGE.to_string(),
        }
    }
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        ProductForm {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            overhead_percentage: product.overhead_percentage.to_string(),
            target_margin_percentage: product.target_margin_percentage.to_string(),
        }
    }
}

/// What a product form submission will do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProductFormMode {
    /// Create a new product.
    New,
    /// Update the product with this id.
    Edit { id: String },
    /// Create a new product duplicated from one named `original_name`.
    Copy { original_name: String },
}

impl ProductFormMode {
    /// Id excluded from the uniqueness check.
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            ProductFormMode::Edit { id } => Some(id.as_str()),
            _ => None,
        }
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Required, then unique among `existing`; returns the trimmed name.
fn check_name<N: Named>(
    errors: &mut FieldErrors,
    name: &str,
    existing: &[N],
    exclude_id: Option<&str>,
) -> Option<String> {
    let name = errors.check(FIELD_NAME, validate_required("Name", name))?;
    errors.check(FIELD_NAME, validate_unique_name(name, existing, exclude_id))?;
    Some(name.to_string())
}

/// Validates a category form; returns the trimmed name.
pub fn validate_category_form(
    form: &CategoryForm,
    existing: &[Category],
    current_id: Option<&str>,
) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = check_name(&mut errors, &form.name, existing, current_id);

    match name {
        Some(name) if errors.is_empty() => Ok(name),
        _ => Err(errors),
    }
}

/// Validates a material form.
pub fn validate_material_form(
    form: &MaterialForm,
    existing: &[Material],
    current_id: Option<&str>,
) -> Result<MaterialInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = check_name(&mut errors, &form.name, existing, current_id);
    let category_id = errors.check(
        FIELD_CATEGORY,
        validate_selection("Category", &form.category_id),
    );
    let standard_price = errors.check(
        FIELD_STANDARD_PRICE,
        parse_price("Price", &form.standard_price),
    );
    let unit = errors
        .check(FIELD_UNIT, validate_selection("Unit", &form.unit))
        .and_then(|code| match code.parse::<Unit>() {
            Ok(unit) => Some(unit),
            Err(_) => {
                errors.push(
                    FIELD_UNIT,
                    ValidationError::Required {
                        field: "Unit".to_string(),
                    },
                );
                None
            }
        });

    match (name, category_id, standard_price, unit) {
        (Some(name), Some(category_id), Some(standard_price), Some(unit)) if errors.is_empty() => {
            Ok(MaterialInput {
                name,
                category_id: category_id.to_string(),
                standard_price,
                unit,
            })
        }
        _ => Err(errors),
    }
}

/// Validates a product form together with its BoM lines.
///
/// In [`ProductFormMode::Copy`] the name must differ from the original
/// before uniqueness is even checked.
pub fn validate_product_form(
    form: &ProductForm,
    bom: &[BomLine],
    existing: &[Product],
    mode: &ProductFormMode,
) -> Result<ProductDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = errors
        .check(FIELD_NAME, validate_required("Name", &form.name))
        .and_then(|name| match mode {
            ProductFormMode::Copy { original_name } => errors
                .check(FIELD_NAME, validate_copy_name(name, original_name))
                .map(|_| name),
            _ => Some(name),
        })
        .and_then(|name| {
            errors
                .check(
                    FIELD_NAME,
                    validate_unique_name(name, existing, mode.editing_id()),
                )
                .map(|_| name.to_string())
        });

    let overhead = errors.check(
        FIELD_OVERHEAD,
        parse_percentage("Overhead", &form.overhead_percentage),
    );
    let margin = errors.check(
        FIELD_MARGIN,
        parse_percentage("Target margin", &form.target_margin_percentage),
    );
    errors.check(FIELD_BOM, validate_bom(bom));

    match (name, overhead, margin) {
        (Some(name), Some(overhead_percentage), Some(target_margin_percentage))
            if errors.is_empty() =>
        {
            let description = form.description.trim();
            Ok(ProductDraft {
                name,
                description: (!description.is_empty()).then(|| description.to_string()),
                overhead_percentage,
                target_margin_percentage,
                bom: bom.to_vec(),
            })
        }
        _ => Err(errors),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::CostBreakdown;
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

    fn product(id: &str, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            overhead_percentage: 20.0,
            target_margin_percentage: 30.0,
            costing: CostBreakdown::default(),
            bom: vec![],
            photos: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn product_form(name: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            description: "  ".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_category_form() {
        let existing = vec![category("1", "Kain")];

        let name = validate_category_form(
            &CategoryForm {
                name: "  Benang ".to_string(),
            },
            &existing,
            None,
        )
        .unwrap();
        assert_eq!(name, "Benang");

        let errors = validate_category_form(
            &CategoryForm {
                name: "KAIN".to_string(),
            },
            &existing,
            None,
        )
        .unwrap_err();
        assert_eq!(
            errors.get(FIELD_NAME),
            Some("Name 'KAIN' is already used, please choose another name")
        );

        assert!(validate_category_form(
            &CategoryForm {
                name: "kain".to_string()
            },
            &existing,
            Some("1")
        )
        .is_ok());
    }

    #[test]
    fn test_material_form_collects_every_field() {
        let form = MaterialForm {
            name: " ".to_string(),
            category_id: "".to_string(),
            standard_price: "-10".to_string(),
            unit: "".to_string(),
        };

        let errors = validate_material_form(&form, &[], None).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(FIELD_NAME), Some("Name is required"));
        assert_eq!(errors.get(FIELD_CATEGORY), Some("Category is required"));
        assert_eq!(
            errors.get(FIELD_STANDARD_PRICE),
            Some("Price must not be negative")
        );
        assert_eq!(errors.get(FIELD_UNIT), Some("Unit is required"));
    }

    #[test]
    fn test_material_form_ok() {
        let form = MaterialForm {
            name: "Kain Katun".to_string(),
            category_id: "cat-1".to_string(),
            standard_price: "12500".to_string(),
            unit: "Cm".to_string(),
        };

        let input = validate_material_form(&form, &[], None).unwrap();
        assert_eq!(input.name, "Kain Katun");
        assert_eq!(input.standard_price, 12_500.0);
        assert_eq!(input.unit, Unit::Cm);
    }

    #[test]
    fn test_product_form_ok() {
        let bom = vec![BomLine::new("a", 10_000.0, 2.0), BomLine::new("b", 5_000.0, 1.0)];
        let draft =
            validate_product_form(&product_form("Tas Kain"), &bom, &[], &ProductFormMode::New)
                .unwrap();

        assert_eq!(draft.name, "Tas Kain");
        assert_eq!(draft.description, None);
        assert_eq!(draft.overhead_percentage, 20.0);
        assert_eq!(draft.costing().estimated_selling_price.rupiah(), 44_643);
    }

    #[test]
    fn test_product_form_reports_bom_and_percentages() {
        let mut form = product_form("Tas Kain");
        form.overhead_percentage = "100".to_string();
        form.target_margin_percentage = "abc".to_string();

        let errors =
            validate_product_form(&form, &[], &[], &ProductFormMode::New).unwrap_err();
        assert!(errors.get(FIELD_OVERHEAD).is_some());
        assert_eq!(
            errors.get(FIELD_MARGIN),
            Some("Target margin must be a number")
        );
        assert_eq!(
            errors.get(FIELD_BOM),
            Some("A product needs at least 1 material")
        );
        assert!(errors.get(FIELD_NAME).is_none());
    }

    #[test]
    fn test_product_form_edit_excludes_self() {
        let existing = vec![product("p1", "Tas Kain"), product("p2", "Dompet")];
        let bom = vec![BomLine::new("a", 1.0, 1.0)];

        let edit = ProductFormMode::Edit {
            id: "p1".to_string(),
        };
        assert!(validate_product_form(&product_form("tas kain"), &bom, &existing, &edit).is_ok());

        let errors =
            validate_product_form(&product_form("dompet"), &bom, &existing, &edit).unwrap_err();
        assert!(errors.get(FIELD_NAME).unwrap().contains("already used"));
    }

    #[test]
    fn test_product_form_copy_checks_divergence_first() {
        let existing = vec![product("p1", "Tas Kain")];
        let bom = vec![BomLine::new("a", 1.0, 1.0)];
        let copy = ProductFormMode::Copy {
            original_name: "Tas Kain".to_string(),
        };

        let errors =
            validate_product_form(&product_form(" TAS KAIN "), &bom, &existing, &copy)
                .unwrap_err();
        assert_eq!(
            errors.get(FIELD_NAME),
            Some("The copy must have a different name than the original product")
        );

        assert!(
            validate_product_form(&product_form("Tas Kain Besar"), &bom, &existing, &copy).is_ok()
        );
    }
}
