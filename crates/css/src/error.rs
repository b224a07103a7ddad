//! Errors raised while building a [`crate::Filter`].

use thiserror::Error;

/// Construction failures. Filtering itself never fails.
#[derive(Debug, Error)]
pub enum ShakeError {
    /// The CSS text did not yield a stylesheet structure at all.
    #[error("No stylesheet found")]
    NoStylesheetFound,
    /// A built-in scanning pattern failed to compile.
    #[error("invalid scanning pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// Options could not be read from JSON.
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}
