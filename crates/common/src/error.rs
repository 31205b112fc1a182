//! Error types for Pump Master domain parsing

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while interpreting domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown pump type: {0}")]
    UnknownPumpType(String),

    #[error("Unknown pump status: {0}")]
    UnknownPumpStatus(String),

    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),

    #[error("Unknown user role: {0}")]
    UnknownRole(String),

    #[error("Unknown test environment: {0}")]
    UnknownEnvironment(String),
}
