//! Error types for agenda.

use thiserror::Error;

/// Errors that can occur in agenda operations.
///
/// These are structural failures. Per-row and per-event problems are not
/// errors in this sense: they are collected as [`ErrorRecord`]s and written
/// to the error log while processing continues.
///
/// [`ErrorRecord`]: crate::error_log::ErrorRecord
#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sources directory not found: {0}")]
    SourcesNotFound(String),

    #[error("Source read error: {0}")]
    Source(String),

    #[error("Special days error: {0}")]
    SpecialDays(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Tracking store error: {0}")]
    Tracking(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("No remote configured")]
    NoRemoteConfigured,
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;
