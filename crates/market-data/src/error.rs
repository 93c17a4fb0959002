//! Market data error types

use thiserror::Error;

use crate::garch::GarchError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// History shorter than the longest rolling window
    #[error("Insufficient history: need {required} rows, have {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Latest row has no implied volatility to merge
    #[error("No implied volatility known on or before {0}")]
    MissingImpliedVol(chrono::NaiveDate),

    #[error(transparent)]
    Garch(#[from] GarchError),
}
