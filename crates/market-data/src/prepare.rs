//! Latest-row inputs for inference, built from raw history in one pass.

use chrono::NaiveDate;
use common::{Bar, VixBar};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::features::{names, FeatureEngine, FeatureRow, LONGEST_WINDOW};
use crate::garch::{VolForecast, VolatilityForecaster};
use crate::merge::MergedSeries;
use crate::{MarketDataError, Result};

/// Everything the model stages and the strategy rules need
#[derive(Debug, Clone)]
pub struct LatestInputs {
    pub trade_date: NaiveDate,
    pub spot: f64,
    /// Volatility index level in percent
    pub implied_vol: f64,
    /// Latest feature row, `Log_GARCH_Vol` included
    pub row: FeatureRow,
    pub garch: VolForecast,
    /// Wall time of the GARCH fit and forecast
    pub garch_elapsed: Duration,
}

/// Merge, derive features, fit GARCH on the full return column and inject
/// its log forecast into the latest row.
pub fn prepare_latest(
    primary: &[Bar],
    volatility: &[VixBar],
    forecaster: &VolatilityForecaster,
) -> Result<LatestInputs> {
    if primary.len() < LONGEST_WINDOW {
        return Err(MarketDataError::InsufficientHistory {
            required: LONGEST_WINDOW,
            actual: primary.len(),
        });
    }

    let merged = MergedSeries::build(primary, volatility);
    let latest = merged.last().copied().ok_or(MarketDataError::InsufficientHistory {
        required: LONGEST_WINDOW,
        actual: 0,
    })?;
    let implied_vol = latest
        .implied_vol
        .ok_or(MarketDataError::MissingImpliedVol(latest.date()))?;

    let frame = FeatureEngine::compute(&merged);
    let mut row = frame.latest().ok_or(MarketDataError::InsufficientHistory {
        required: LONGEST_WINDOW,
        actual: 0,
    })?;

    let returns: Vec<f64> = frame
        .column(names::LOG_RET)
        .unwrap_or_default()
        .iter()
        .flatten()
        .copied()
        .collect();
    let fit_started = Instant::now();
    let garch = forecaster.forecast(&returns)?;
    let garch_elapsed = fit_started.elapsed();
    row.insert(names::LOG_GARCH_VOL, garch.annualized_vol.ln());

    debug!(
        date = %latest.date(),
        rows = merged.len(),
        features = row.len(),
        garch_vol = garch.annualized_vol,
        "Prepared latest inputs"
    );

    Ok(LatestInputs {
        trade_date: latest.date(),
        spot: latest.bar.close,
        implied_vol,
        row,
        garch,
        garch_elapsed,
    })
}
