//! Prediction error taxonomy

use common::SeriesKind;
use inference::InferenceError;
use market_data::{GarchError, MarketDataError};
use observability::PredictionOutcome;
use storage::StorageError;
use strategy::StrategyError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// Models failed to load at startup
    #[error("AI models not loaded: {0}")]
    ServiceUnavailable(String),

    #[error("{} data missing", .0.symbol())]
    NotFound(SeriesKind),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Feature schema mismatch in {stage} stage, missing: {}", missing.join(", "))]
    SchemaMismatch { stage: String, missing: Vec<String> },

    #[error("Volatility fit failed: {0}")]
    FitFailure(String),

    #[error("Error reading series: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn outcome(&self) -> PredictionOutcome {
        match self {
            Self::ServiceUnavailable(_) => PredictionOutcome::Unavailable,
            Self::NotFound(_) => PredictionOutcome::NotFound,
            Self::InsufficientData(_) => PredictionOutcome::InsufficientData,
            Self::SchemaMismatch { .. } => PredictionOutcome::SchemaMismatch,
            Self::FitFailure(_) => PredictionOutcome::FitFailure,
            Self::Storage(_) | Self::Internal(_) => PredictionOutcome::Error,
        }
    }
}

impl From<StorageError> for PredictError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(kind) => Self::NotFound(kind),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<MarketDataError> for PredictError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::InsufficientHistory { .. } | MarketDataError::MissingImpliedVol(_) => {
                Self::InsufficientData(err.to_string())
            }
            MarketDataError::Garch(e @ GarchError::InsufficientObservations { .. }) => {
                Self::InsufficientData(e.to_string())
            }
            MarketDataError::Garch(e) => Self::FitFailure(e.to_string()),
        }
    }
}

impl From<StrategyError> for PredictError {
    fn from(err: StrategyError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<InferenceError> for PredictError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Unavailable(reason) => Self::ServiceUnavailable(reason),
            InferenceError::SchemaMismatch { stage, missing } => Self::SchemaMismatch { stage, missing },
            other => Self::Internal(other.to_string()),
        }
    }
}
