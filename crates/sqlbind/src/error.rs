//! Error types for sqlbind

use thiserror::Error;

/// Result type alias for sqlbind operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for SQL construction and result binding
#[derive(Debug, Error)]
pub enum SqlError {
    /// Invalid builder state detected at render time (missing WHERE clause,
    /// zero columns, mismatched value lists, empty batch dataset, ...)
    #[error("Builder error: {0}")]
    Builder(String),

    /// Strict-mode mapping failure: a result column has no matching field
    #[error("{entity} has no field matching column '{column}'")]
    FieldNotFound { entity: String, column: String },

    /// Row-set shape or instantiation failure during a mapping pass
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// A field reference could not be resolved against a batch record
    #[error("Reference resolution error: {0}")]
    RefResolution(String),

    /// Opaque failure from the external execution layer
    #[error("Execution error: {0}")]
    Execution(String),
}

impl SqlError {
    /// Create a builder state error
    pub fn builder(message: impl Into<String>) -> Self {
        Self::Builder(message.into())
    }

    /// Create a field-not-found error for a specific entity type and column
    pub fn field_not_found(entity: impl Into<String>, column: impl Into<String>) -> Self {
        Self::FieldNotFound {
            entity: entity.into(),
            column: column.into(),
        }
    }

    /// Create a reference resolution error
    pub fn ref_resolution(message: impl Into<String>) -> Self {
        Self::RefResolution(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is a builder state error
    pub fn is_builder(&self) -> bool {
        matches!(self, Self::Builder(_))
    }

    /// Check if this is a field-not-found error
    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Self::FieldNotFound { .. })
    }
}
