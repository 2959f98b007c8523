//! # Validation Module
//!
//! Field checkers and deletion guards.
//!
//! ## Validation Flow
//! ```text
//! Form text ──► required / parse ──► range checks ──► unique name ──► typed input
//!                    │                    │                │
//!                    ▼                    ▼                ▼
//!              ValidationError      ValidationError   ValidationError
//! ```
//!
//! Each checker is independent and returns the first problem it finds.
//! Aggregating a whole form into [`FieldErrors`](crate::error::FieldErrors)
//! happens in [`forms`](crate::forms).
//!
//! ## Usage
//! ```rust
//! use hpp_core::validation::{validate_percentage, validate_required};
//!
//! assert!(validate_required("Name", "   ").is_err());
//! assert_eq!(validate_percentage("Overhead", 20.0).unwrap(), 20.0);
//! assert!(validate_percentage("Overhead", 100.0).is_err());
//! ```

use crate::error::{CoreError, ValidationError};
use crate::types::{BomLine, Category, Material, Product};
use crate::{MAX_PHOTO_SIZE_BYTES, MAX_PRODUCT_PHOTOS};

// =============================================================================
// Named Items
// =============================================================================

/// An item whose name must be unique among items of its kind.
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Named for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Material {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Trimmed, lowercased form used for name comparisons.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Text Checks
// =============================================================================

/// Rejects empty or whitespace-only text; returns the trimmed value.
pub fn validate_required<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(trimmed)
}

/// Like [`validate_required`], for picker values (category, unit, material).
pub fn validate_selection<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    validate_required(field, value)
}

/// Rejects a name already used by another item of the same kind.
///
/// Comparison is trimmed and case-insensitive. When editing, pass the id of
/// the item being edited so it does not collide with itself.
///
/// ```rust
/// use hpp_core::validation::{validate_unique_name, Named};
///
/// struct Item(&'static str, &'static str);
/// impl Named for Item {
///     fn id(&self) -> &str { self.0 }
///     fn name(&self) -> &str { self.1 }
/// }
///
/// let existing = [Item("1", "Kain")];
/// assert!(validate_unique_name("kain ", &existing, None).is_err());
/// assert!(validate_unique_name("Kain", &existing, Some("1")).is_ok());
/// ```
pub fn validate_unique_name<N: Named>(
    name: &str,
    existing: &[N],
    exclude_id: Option<&str>,
) -> Result<(), ValidationError> {
    let wanted = normalize_name(name);
    let taken = existing
        .iter()
        .filter(|item| Some(item.id()) != exclude_id)
        .any(|item| normalize_name(item.name()) == wanted);

    if taken {
        return Err(ValidationError::Duplicate {
            value: name.trim().to_string(),
        });
    }
    Ok(())
}

/// A copied product must not keep the original's name.
pub fn validate_copy_name(name: &str, original_name: &str) -> Result<(), ValidationError> {
    if normalize_name(name) == normalize_name(original_name) {
        return Err(ValidationError::SameAsOriginal);
    }
    Ok(())
}

// =============================================================================
// Numeric Checks
// =============================================================================

/// Reads form text as a finite number.
pub fn parse_number(field: &str, text: &str) -> Result<f64, ValidationError> {
    let trimmed = validate_required(field, text)?;
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotANumber {
            field: field.to_string(),
        }),
    }
}

/// Prices must be zero or more. There is no upper bound.
pub fn validate_price(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Quantities must be strictly positive.
pub fn validate_quantity(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Percentages must satisfy `0 <= p < 100`.
pub fn validate_percentage(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }
    if !(0.0..100.0).contains(&value) {
        return Err(ValidationError::PercentageOutOfRange {
            field: field.to_string(),
        });
    }
    Ok(value)
}

pub fn parse_price(field: &str, text: &str) -> Result<f64, ValidationError> {
    validate_price(field, parse_number(field, text)?)
}

pub fn parse_quantity(field: &str, text: &str) -> Result<f64, ValidationError> {
    validate_quantity(field, parse_number(field, text)?)
}

pub fn parse_percentage(field: &str, text: &str) -> Result<f64, ValidationError> {
    validate_percentage(field, parse_number(field, text)?)
}

// =============================================================================
// Bill of Materials
// =============================================================================

/// Checks that the BoM has at least one line and every line is complete.
///
/// Stops at the first bad line; line numbers in messages start at 1.
pub fn validate_bom(lines: &[BomLine]) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyBom);
    }

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;
        if !line.has_material() {
            return Err(ValidationError::MaterialNotSelected { line: number });
        }
        let in_line = |reason: ValidationError| ValidationError::BomLine {
            line: number,
            reason: Box::new(reason),
        };
        validate_quantity("Quantity", line.quantity).map_err(in_line)?;
        validate_price("Price", line.price).map_err(in_line)?;
    }

    Ok(())
}

// =============================================================================
// Deletion Guards
// =============================================================================

/// A category may be deleted only when no material references it.
pub fn ensure_category_deletable(name: &str, material_count: i64) -> Result<(), CoreError> {
    if material_count > 0 {
        return Err(CoreError::CategoryInUse {
            name: name.to_string(),
            material_count,
        });
    }
    Ok(())
}

/// A material may be deleted only when no BoM line references it.
pub fn ensure_material_deletable(name: &str, bom_line_count: i64) -> Result<(), CoreError> {
    if bom_line_count > 0 {
        return Err(CoreError::MaterialInUse {
            name: name.to_string(),
            bom_line_count,
        });
    }
    Ok(())
}

// =============================================================================
// Photo Uploads
// =============================================================================

/// Checks one upload against the type, size and per-product count limits.
pub fn validate_photo_upload(
    file_name: &str,
    mime_type: &str,
    size_bytes: u64,
    current_count: usize,
) -> Result<(), ValidationError> {
    if current_count >= MAX_PRODUCT_PHOTOS {
        return Err(ValidationError::TooManyPhotos {
            max: MAX_PRODUCT_PHOTOS,
            current: current_count,
        });
    }
    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            file_name: file_name.to_string(),
        });
    }
    if size_bytes > MAX_PHOTO_SIZE_BYTES {
        return Err(ValidationError::FileTooLarge {
            file_name: file_name.to_string(),
            max_bytes: MAX_PHOTO_SIZE_BYTES,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
