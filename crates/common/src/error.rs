//! Common error types for VolRegime

use thiserror::Error;

/// Errors raised by the shared helpers in this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Date did not match the DD-MM-YYYY wire format
    #[error("Date '{0}' must be in DD-MM-YYYY format")]
    InvalidDate(String),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;
