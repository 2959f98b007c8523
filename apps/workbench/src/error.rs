//! # API Error Type
//!
//! Unified error type for workbench actions.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Workbench                          │
//! │                                                                         │
//! │  Caller                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  create_material(form)                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Action Function                                                 │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Form invalid? ───── FieldErrors ─────────────────┐              │  │
//! │  │         │                                          │              │  │
//! │  │         ▼                                          ▼              │  │
//! │  │  Guard failed? ───── CoreError::MaterialInUse ── ApiError ──────►│  │
//! │  │         │                                          ▲              │  │
//! │  │         ▼                                          │              │  │
//! │  │  Database error? ─── DbError::QueryFailed ─────────┘              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use ts_rs::TS;

use hpp_core::{CoreError, FieldError, FieldErrors};
use hpp_db::DbError;

use crate::config::ConfigError;

/// API error returned from workbench actions.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Invalid input: name: Name is required",
///   "fieldErrors": [{ "field": "name", "message": "Name is required" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Failed form fields; empty unless a form was rejected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Delete blocked by references
    InUse,

    /// Database operation failed
    DatabaseError,

    /// Photo storage failed
    StorageError,

    /// Configuration could not be loaded
    ConfigError,

    /// Business rule refused the request
    BusinessLogic,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Validation error carrying every failed field of a form.
    pub fn invalid_form(errors: FieldErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: format!("Invalid input: {}", errors),
            field_errors: errors.into_vec(),
        }
    }

    /// Message recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Converts database errors to API errors.
///
/// Collaborator errors keep their message so the caller can show it as-is.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Storage(message) => {
                tracing::error!("Photo storage failed: {}", message);
                ApiError::new(ErrorCode::StorageError, message)
            }
            DbError::QueryFailed(message) | DbError::Internal(message) => {
                tracing::error!("Database operation failed: {}", message);
                ApiError::new(ErrorCode::DatabaseError, message)
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CategoryNotFound(id) => ApiError::not_found("Category", &id),
            CoreError::MaterialNotFound(id) => ApiError::not_found("Material", &id),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            e @ (CoreError::CategoryInUse { .. } | CoreError::MaterialInUse { .. }) => {
                ApiError::new(ErrorCode::InUse, e.to_string())
            }
            CoreError::InvalidForm(errors) => ApiError::invalid_form(errors),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::invalid_form(errors)
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for workbench actions.
pub type ApiResult<T> = Result<T, ApiError>;
