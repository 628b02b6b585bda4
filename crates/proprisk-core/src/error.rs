//! Error types for Proprisk

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropriskError {
    // Input validation
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // CRS errors
    #[error("Projection from {from} to {to} failed: {reason}")]
    Projection {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid CRS identifier '{input}': {reason}")]
    InvalidCrs { input: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PropriskError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), reason: reason.into() }
    }

    /// True for errors raised while building or applying a CRS transformation
    pub fn is_projection(&self) -> bool {
        matches!(self, Self::Projection { .. } | Self::InvalidCrs { .. })
    }
}

impl From<serde_json::Error> for PropriskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PropriskError>;
