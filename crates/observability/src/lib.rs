//! Logging and metrics for VolRegime
//!
//! - Structured logging via tracing
//! - Prometheus exporter
//! - Prediction pipeline metric helpers
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("volregime", LogFormat::Pretty)?;
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, PredictionMetrics, PredictionOutcome};
