//! Error types for the scan engine.
//!
//! A visibility scan is best-effort over a live document: unavailable
//! references and degenerate geometry degrade to neutral results plus
//! advisory records rather than errors. Only a bad configuration or a
//! host cancellation aborts a scan.

use thiserror::Error;

/// Errors that can occur during a visibility scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Invalid scan settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The host cancelled the scan at a yield point.
    #[error("scan cancelled")]
    Cancelled,
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
