//! Common error types for the reconciliation core

use thiserror::Error;

/// Common result type for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reconciling a single document
///
/// None of these abort a batch: the driver turns each one into a
/// failed outcome for the document that raised it.
#[derive(Error, Debug)]
pub enum Error {
    /// Assessment record failed validation (unknown category, bad date, bad id)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Template engine returned text without a recognizable fact box
    #[error("Merge failure: {0}")]
    MergeFailure(String),

    /// Template engine could not parse or write the fact box
    #[error("Template engine error: {0}")]
    TemplateEngine(String),

    /// Malformed input handed to the core (e.g. non-scalar field value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
