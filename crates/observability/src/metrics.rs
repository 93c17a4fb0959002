//! Prometheus metrics for the prediction pipeline

use metrics::{counter, histogram, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter; metrics are served at `/metrics`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new().with_http_listener(addr).install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Outcome label for `predictions_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutcome {
    Success,
    Unavailable,
    NotFound,
    InsufficientData,
    SchemaMismatch,
    FitFailure,
    Error,
}

impl PredictionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unavailable => "unavailable",
            Self::NotFound => "not_found",
            Self::InsufficientData => "insufficient_data",
            Self::SchemaMismatch => "schema_mismatch",
            Self::FitFailure => "fit_failure",
            Self::Error => "error",
        }
    }
}

/// Metric handles for the prediction service.
///
/// * `predictions_total{outcome}` - requests by outcome
/// * `prediction_duration_seconds` - end-to-end latency
/// * `garch_fit_duration_seconds` - time spent in the volatility fit
#[derive(Clone)]
pub struct PredictionMetrics {
    prediction_duration: Histogram,
    garch_fit_duration: Histogram,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            prediction_duration: histogram!("prediction_duration_seconds"),
            garch_fit_duration: histogram!("garch_fit_duration_seconds"),
        }
    }

    pub fn record_prediction(&self, duration: Duration, outcome: PredictionOutcome) {
        counter!("predictions_total", "outcome" => outcome.as_str()).increment(1);
        self.prediction_duration.record(duration.as_secs_f64());
    }

    pub fn record_garch_fit(&self, duration: Duration) {
        self.garch_fit_duration.record(duration.as_secs_f64());
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_a_noop() {
        let metrics = PredictionMetrics::new();
        metrics.record_prediction(Duration::from_millis(5), PredictionOutcome::Success);
        metrics.record_garch_fit(Duration::from_millis(2));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(PredictionOutcome::FitFailure.as_str(), "fit_failure");
        assert_eq!(PredictionOutcome::Unavailable.as_str(), "unavailable");
    }
}
