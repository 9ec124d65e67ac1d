//! Kiosk startup errors.

use thiserror::Error;

/// Errors that stop the kiosk binary.
#[derive(Debug, Error)]
pub enum KioskError {
    /// An environment variable is present but invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
