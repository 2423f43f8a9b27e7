//! Error types for spec registration and conversion lookup.

use thiserror::Error;
use tksc_par::ParseError;

/// Errors raised while registering specs or resolving conversions.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec JSON did not match its schema.
    #[error("invalid spec: {0}")]
    Json(#[from] serde_json::Error),

    /// A field failed validation beyond shape.
    #[error("invalid spec: {message}")]
    Invalid { message: String },

    /// An embedded script failed to parse.
    #[error("failed to parse embedded script: {0}")]
    Script(#[from] ParseError),

    /// A URI no registration matches, under any version fallback.
    #[error("unknown spec uri '{uri}'")]
    UnknownUri { uri: String },

    /// BFS found no conversion route.
    #[error("no conversion path from '{from}' to '{to}'")]
    NoConversionPath { from: String, to: String },

    /// A color subtype name with no registered spec.
    #[error("unknown color subtype '{subtype}'")]
    UnknownSubtype { subtype: String },

    /// A unit keyword with no registered spec.
    #[error("unknown unit '{keyword}'")]
    UnknownUnit { keyword: String },
}

impl SpecError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SpecError::Invalid {
            message: message.into(),
        }
    }
}

/// Result alias for spec operations.
pub type Result<T> = std::result::Result<T, SpecError>;
