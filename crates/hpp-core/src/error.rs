//! # Error Types
//!
//! Domain-specific error types for hpp-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hpp-core errors (this file)                                           │
//! │  ├── ValidationError  - One failed field check                         │
//! │  ├── FieldErrors      - All failed checks of one form submission       │
//! │  └── CoreError        - Domain errors (not found, still referenced)    │
//! │                                                                         │
//! │  hpp-db errors (separate crate)                                        │
//! │  └── DbError          - Database / storage failures                    │
//! │                                                                         │
//! │  Workbench errors (in app)                                             │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → CoreError → DbError → ApiError  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The costing engine has no error type: it never fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Deletion blocked because materials still point at the category.
    ///
    /// ## User Workflow
    /// ```text
    /// Delete category "Kain"
    ///      │
    ///      ▼
    /// count materials with category_id = Kain → 3
    ///      │
    ///      ▼
    /// CategoryInUse { name: "Kain", material_count: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Category 'Kain' is still used by 3 material(s)"
    /// ```
    #[error("Category '{name}' is still used by {material_count} material(s) and cannot be deleted")]
    CategoryInUse { name: String, material_count: i64 },

    /// Deletion blocked because BoM lines still point at the material.
    #[error("Material '{name}' is still used by {bom_line_count} bill of materials line(s) and cannot be deleted")]
    MaterialInUse { name: String, bom_line_count: i64 },

    /// A form submission failed one or more field checks.
    #[error("Invalid input: {0}")]
    InvalidForm(FieldErrors),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::InvalidForm(errors)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The `Display` output is the message shown next to the field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Text could not be read as a number.
    #[error("{field} must be a number")]
    NotANumber { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Percentage outside `0 <= p < 100`.
    #[error("{field} must be at least 0 and less than 100")]
    PercentageOutOfRange { field: String },

    /// Another item of the same kind already uses this name.
    #[error("Name '{value}' is already used, please choose another name")]
    Duplicate { value: String },

    /// A copied product kept the name of the product it was copied from.
    #[error("The copy must have a different name than the original product")]
    SameAsOriginal,

    /// Product has no BoM lines.
    #[error("A product needs at least 1 material")]
    EmptyBom,

    /// A BoM line has no material selected.
    #[error("Line {line}: select a material")]
    MaterialNotSelected { line: usize },

    /// A BoM line failed its quantity or price check.
    #[error("Line {line}: {reason}")]
    BomLine {
        line: usize,
        reason: Box<ValidationError>,
    },

    /// Uploaded file is not an image.
    #[error("File '{file_name}' must be an image")]
    NotAnImage { file_name: String },

    /// Uploaded file exceeds the size limit.
    #[error("File '{file_name}' is larger than {max_bytes} bytes")]
    FileTooLarge { file_name: String, max_bytes: u64 },

    /// Product already has the maximum number of photos.
    #[error("At most {max} photos are allowed, this product already has {current}")]
    TooManyPhotos { max: usize, current: usize },
}

// =============================================================================
// Field Errors
// =============================================================================

/// A single failed field of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    /// Form field key, e.g. `"name"`, `"overhead_percentage"`, `"bom"`.
    pub field: String,
    /// Human-readable message for the field.
    pub message: String,
}

/// Ordered list of failed fields for one form submission.
///
/// An empty list means the submission may proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(Vec::new())
    }

    /// Records `error` against `field`.
    pub fn push(&mut self, field: &str, error: ValidationError) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: error.to_string(),
        });
    }

    /// Records the error of `result` (if any) against `field` and returns
    /// the value when the check passed.
    pub fn check<T>(&mut self, field: &str, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_use_messages_carry_exact_count() {
        let err = CoreError::MaterialInUse {
            name: "Kain Katun".to_string(),
            bom_line_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Material 'Kain Katun' is still used by 2 bill of materials line(s) and cannot be deleted"
        );

        let err = CoreError::CategoryInUse {
            name: "Kain".to_string(),
            material_count: 3,
        };
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_bom_line_message_is_line_specific() {
        let err = ValidationError::BomLine {
            line: 2,
            reason: Box::new(ValidationError::MustBePositive {
                field: "Quantity".to_string(),
            }),
        };
        assert_eq!(err.to_string(), "Line 2: Quantity must be greater than 0");
    }

    #[test]
    fn test_field_errors_collects_in_order() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        let ok: Option<u8> = errors.check("unit", Ok(1));
        assert_eq!(ok, Some(1));

        errors.push(
            "name",
            ValidationError::Required {
                field: "Name".to_string(),
            },
        );
        let failed: Option<f64> = errors.check(
            "standard_price",
            Err(ValidationError::Negative {
                field: "Price".to_string(),
            }),
        );
        assert!(failed.is_none());

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("standard_price"), Some("Price must not be negative"));
        assert_eq!(errors.get("unit"), None);
    }

    #[test]
    fn test_field_errors_serialize_as_list() {
        let mut errors = FieldErrors::new();
        errors.push("bom", ValidationError::EmptyBom);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "field": "bom", "message": "A product needs at least 1 material" }])
        );
    }

    #[test]
    fn test_field_errors_convert_to_core_error() {
        let mut errors = FieldErrors::new();
        errors.push("bom", ValidationError::EmptyBom);
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::InvalidForm(_)));
    }
}
