//! Error handling for the tkst CLI.

use thiserror::Error;

/// Main error type for the tkst CLI application.
#[derive(Debug, Error)]
pub enum TkstError {
    /// Logging or configuration setup failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO failure reading inputs or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A spec file failed to register.
    #[error("Spec registration failed: {0}")]
    Spec(#[from] tksc_spec::SpecError),

    /// A single-expression evaluation failed.
    #[error("Evaluation failed: {0}")]
    Eval(#[from] tksc_drv::EvalError),

    /// A DTCG document failed to flatten.
    #[error("DTCG error: {0}")]
    Dtcg(#[from] tksc_drv::dtcg::DtcgError),
}

/// Result type alias using TkstError.
pub type Result<T> = std::result::Result<T, TkstError>;
