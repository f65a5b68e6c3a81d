//! Error types for tsorm

use thiserror::Error;

/// Result type alias for tsorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for schema discovery, literal rendering and statement building.
///
/// Every error is fatal for the statement being built: builders stop at the first
/// failure and surface it from `build()`, so no partially rendered SQL escapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrmError {
    /// Missing or invalid table/column metadata on a type
    #[error("Schema error: {0}")]
    Schema(String),

    /// Illegal attribute combination
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Value shape the literal renderer cannot lower
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Expression node or operator the compiler cannot lower
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Declarative expression missing a required operand
    #[error("Missing operand: {0}")]
    MissingOperand(String),

    /// Builder protocol violation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid argument (type pairing, blank names)
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Internal invariant broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl OrmError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an unsupported type error
    pub fn unsupported_type(message: impl Into<String>) -> Self {
        Self::UnsupportedType(message.into())
    }

    /// Create an unsupported expression error
    pub fn unsupported_expression(message: impl Into<String>) -> Self {
        Self::UnsupportedExpression(message.into())
    }

    /// Create a missing operand error
    pub fn missing_operand(message: impl Into<String>) -> Self {
        Self::MissingOperand(message.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Create an invalid argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Check if this is a schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Check if this is an unsupported type or expression error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedType(_) | Self::UnsupportedExpression(_))
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::UnsupportedType(format!("JSON serialization failed: {err}"))
    }
}
