use std::time::Duration;
use thiserror::Error;

/// Everything that can stop a scan from returning a payload
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Empty, oversized, corrupt or zero-area image data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No codec recognizes the container
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Every candidate was tried without success
    #[error("No QR code found after {attempts} attempts{}", last_failure_suffix(.last_failure))]
    NoQrCodeFound {
        /// Decode attempts made
        attempts: usize,
        /// Reason reported by the final failed attempt
        last_failure: Option<String>,
    },

    /// The time budget ran out first
    #[error("Scan abandoned after {attempts} attempts ({elapsed:?} elapsed)")]
    Timeout {
        /// Decode attempts made before giving up
        attempts: usize,
        /// Time spent scanning
        elapsed: Duration,
    },
}

fn last_failure_suffix(last_failure: &Option<String>) -> String {
    match last_failure {
        Some(reason) => format!(" (last error: {reason})"),
        None => String::new(),
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, DecodeError>;
