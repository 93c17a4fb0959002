use inference::{ModelRegistry, StagePlan};
use market_data::{prepare_latest, VolatilityForecaster, LONGEST_WINDOW};
use observability::{PredictionMetrics, PredictionOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::SeriesStore;
use strategy::SelectorInputs;
use tracing::{info, instrument, warn};

use crate::report::PredictionReport;
use crate::{PredictError, Result};

/// Request-scoped pipeline over a shared store and an immutable registry
#[derive(Clone)]
pub struct PredictionService {
    store: Arc<dyn SeriesStore>,
    registry: Arc<ModelRegistry>,
    forecaster: VolatilityForecaster,
    fit_timeout: Duration,
    metrics: PredictionMetrics,
}

impl PredictionService {
    pub fn new(
        store: Arc<dyn SeriesStore>,
        registry: Arc<ModelRegistry>,
        forecaster: VolatilityForecaster,
        fit_timeout: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            forecaster,
            fit_timeout,
            metrics: PredictionMetrics::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SeriesStore> {
        &self.store
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Recommendation for the most recent stored date.
    #[instrument(skip(self))]
    pub async fn predict(&self) -> Result<PredictionReport> {
        let started = Instant::now();
        let result = self.run_pipeline().await;
        let elapsed = started.elapsed();

        match &result {
            Ok(report) => {
                self.metrics.record_prediction(elapsed, PredictionOutcome::Success);
                info!(
                    date = %report.date,
                    strategy = ?report.recommendation.strategy,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Prediction complete"
                );
            }
            Err(e) => {
                self.metrics.record_prediction(elapsed, e.outcome());
                warn!(error = %e, elapsed_ms = elapsed.as_millis() as u64, "Prediction failed");
            }
        }
        result
    }

    async fn run_pipeline(&self) -> Result<PredictionReport> {
        let models = self.registry.models()?;

        let primary = self.store.read_primary().await?;
        let volatility = self.store.read_volatility().await?;
        if primary.len() < LONGEST_WINDOW {
            return Err(PredictError::InsufficientData(format!(
                "need at least {} rows of history, have {}",
                LONGEST_WINDOW,
                primary.len()
            )));
        }

        let forecaster = self.forecaster;
        let worker = tokio::task::spawn_blocking(move || {
            prepare_latest(&primary, &volatility, &forecaster)
        });
        let inputs = match tokio::time::timeout(self.fit_timeout, worker).await {
            Err(_) => {
                return Err(PredictError::FitFailure(format!(
                    "timed out after {}s",
                    self.fit_timeout.as_secs_f64()
                )))
            }
            Ok(Err(join)) => return Err(PredictError::Internal(join.to_string())),
            Ok(Ok(prepared)) => prepared?,
        };
        self.metrics.record_garch_fit(inputs.garch_elapsed);

        let outputs = StagePlan::standard(models).run(inputs.row.clone())?;

        let recommendation = strategy::select(&SelectorInputs {
            predicted_vol: outputs.predicted_vol,
            bull_probability: outputs.bull_probability,
            implied_vol: inputs.implied_vol,
            spot: inputs.spot,
            trade_date: inputs.trade_date,
        })?;

        Ok(PredictionReport::assemble(
            &inputs,
            outputs.predicted_vol,
            outputs.bull_probability,
            recommendation,
        ))
    }
}
