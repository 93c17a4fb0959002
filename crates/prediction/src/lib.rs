//! Prediction pipeline for VolRegime
//!
//! `PredictionService::predict` reads the freshest stored series, derives
//! features, fits GARCH on a blocking worker, runs the two model stages and
//! hands the outputs to the strategy rules. Nothing is cached between
//! calls; a failed call leaves no state behind.

pub mod error;
pub mod report;
pub mod service;

pub use error::PredictError;
pub use report::PredictionReport;
pub use service::PredictionService;

pub type Result<T> = std::result::Result<T, PredictError>;
