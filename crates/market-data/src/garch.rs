//! Zero-mean GARCH(1,1) fit and multi-step variance forecast.
//!
//! Returns are scaled to percent before fitting; the forecast is scaled
//! back to a decimal annualized volatility.
//!
//! ```text
//! σ²_t = ω + α·ε²_{t-1} + β·σ²_{t-1},   ω > 0, α ≥ 0, β ≥ 0, α + β < 1
//! ```

use thiserror::Error;
use tracing::debug;

use crate::optimize::NelderMead;

const PERCENT: f64 = 100.0;
const TRADING_DAYS: f64 = 252.0;
const BACKCAST_DECAY: f64 = 0.94;
const BACKCAST_SPAN: usize = 75;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GarchError {
    #[error("Need at least {required} returns to fit, got {actual}")]
    InsufficientObservations { required: usize, actual: usize },

    #[error("Return series has zero variance")]
    DegenerateSeries,

    #[error("Optimizer did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("Volatility forecast is not finite")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchSettings {
    /// Most recent returns used for the fit
    pub window: usize,
    pub horizon: usize,
    pub min_observations: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for GarchSettings {
    fn default() -> Self {
        Self {
            window: 1000,
            horizon: 5,
            min_observations: 30,
            max_iterations: 2000,
            tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchParams {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl GarchParams {
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    fn is_admissible(&self) -> bool {
        self.omega > 0.0
            && self.alpha >= 0.0
            && self.beta >= 0.0
            && self.persistence() < 1.0
            && self.omega.is_finite()
    }

    /// Map an unconstrained point onto the admissible region.
    fn from_unconstrained(u: &[f64]) -> Self {
        let a = u[1].exp();
        let b = u[2].exp();
        let total = 1.0 + a + b;
        Self {
            omega: u[0].exp(),
            alpha: a / total,
            beta: b / total,
        }
    }

    fn to_unconstrained(self) -> [f64; 3] {
        let rest = 1.0 - self.alpha - self.beta;
        [
            self.omega.ln(),
            (self.alpha / rest).ln(),
            (self.beta / rest).ln(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GarchFit {
    pub params: GarchParams,
    pub log_likelihood: f64,
    pub iterations: usize,
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolForecast {
    /// Decimal annualized volatility over the horizon
    pub annualized_vol: f64,
    /// Per-step variance forecasts, in percent-squared units
    pub variances: Vec<f64>,
    pub fit: GarchFit,
}

/// Stateless per call; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityForecaster {
    settings: GarchSettings,
}

impl VolatilityForecaster {
    pub fn new(settings: GarchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GarchSettings {
        &self.settings
    }

    /// Fit on the trailing window of `log_returns` and forecast.
    ///
    /// Non-finite returns are skipped before the window is taken.
    pub fn forecast(&self, log_returns: &[f64]) -> Result<VolForecast, GarchError> {
        let defined: Vec<f64> = log_returns.iter().copied().filter(|r| r.is_finite()).collect();
        let start = defined.len().saturating_sub(self.settings.window);
        let shocks: Vec<f64> = defined[start..].iter().map(|r| r * PERCENT).collect();

        let fit = self.fit(&shocks)?;
        let params = fit.params;

        let backcast = backcast(&shocks);
        let sigma2 = conditional_variances(&params, &shocks, backcast);
        let (last_shock, last_variance) = match (shocks.last(), sigma2.last()) {
            (Some(e), Some(s)) => (*e, *s),
            _ => return Err(GarchError::NonFinite),
        };

        let variances = forecast_variances(&params, last_shock, last_variance, self.settings.horizon);
        let mean_variance = variances.iter().sum::<f64>() / variances.len().max(1) as f64;
        let annualized_vol = mean_variance.sqrt() * TRADING_DAYS.sqrt() / PERCENT;

        if !annualized_vol.is_finite() || variances.is_empty() {
            return Err(GarchError::NonFinite);
        }

        debug!(
            omega = params.omega,
            alpha = params.alpha,
            beta = params.beta,
            annualized_vol,
            "GARCH forecast"
        );

        Ok(VolForecast {
            annualized_vol,
            variances,
            fit,
        })
    }

    /// Maximum-likelihood fit on percent-scaled shocks.
    pub fn fit(&self, shocks: &[f64]) -> Result<GarchFit, GarchError> {
        let n = shocks.len();
        let required = self.settings.min_observations.max(2);
        if n < required {
            return Err(GarchError::InsufficientObservations {
                required,
                actual: n,
            });
        }

        let mean = shocks.iter().sum::<f64>() / n as f64;
        let mean_square = shocks.iter().map(|e| e * e).sum::<f64>() / n as f64;
        let variance = shocks.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        if mean_square == 0.0 || variance <= mean_square * 1e-14 || !variance.is_finite() {
            return Err(GarchError::DegenerateSeries);
        }

        let backcast = backcast(shocks);
        let objective = |u: &[f64]| {
            negative_log_likelihood(&GarchParams::from_unconstrained(u), shocks, backcast)
        };

        let start = starting_point(shocks, mean_square, backcast);
        let optimizer = NelderMead::new(self.settings.max_iterations, self.settings.tolerance);
        let minimum = optimizer.minimize(objective, &start.to_unconstrained());

        if !minimum.converged {
            return Err(GarchError::NotConverged {
                iterations: minimum.iterations,
            });
        }

        let params = GarchParams::from_unconstrained(&minimum.point);
        if !params.is_admissible() || !minimum.value.is_finite() {
            return Err(GarchError::NonFinite);
        }

        Ok(GarchFit {
            params,
            log_likelihood: -minimum.value,
            iterations: minimum.iterations,
            observations: n,
        })
    }
}

/// Exponentially weighted mean of the earliest squared shocks, used as the
/// pre-sample variance.
pub fn backcast(shocks: &[f64]) -> f64 {
    let span = shocks.len().min(BACKCAST_SPAN);
    let mut weight = 1.0;
    let mut total_weight = 0.0;
    let mut acc = 0.0;
    for e in &shocks[..span] {
        acc += weight * e * e;
        total_weight += weight;
        weight *= BACKCAST_DECAY;
    }
    if total_weight > 0.0 {
        acc / total_weight
    } else {
        0.0
    }
}

pub fn conditional_variances(params: &GarchParams, shocks: &[f64], backcast: f64) -> Vec<f64> {
    let mut sigma2 = Vec::with_capacity(shocks.len());
    let mut prev_sq = backcast;
    let mut prev_var = backcast;
    for e in shocks {
        let var = params.omega + params.alpha * prev_sq + params.beta * prev_var;
        sigma2.push(var);
        prev_sq = e * e;
        prev_var = var;
    }
    sigma2
}

/// Gaussian negative log-likelihood; `+inf` outside the admissible region.
pub fn negative_log_likelihood(params: &GarchParams, shocks: &[f64], backcast: f64) -> f64 {
    if !params.is_admissible() {
        return f64::INFINITY;
    }
    let ln_2pi = (2.0 * std::f64::consts::PI).ln();
    conditional_variances(params, shocks, backcast)
        .iter()
        .zip(shocks)
        .map(|(s2, e)| 0.5 * (ln_2pi + s2.ln() + e * e / s2))
        .sum()
}

/// h = 1 uses the last shock and variance; later steps decay toward the
/// unconditional variance.
pub fn forecast_variances(
    params: &GarchParams,
    last_shock: f64,
    last_variance: f64,
    horizon: usize,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(horizon);
    let mut next = params.omega + params.alpha * last_shock * last_shock + params.beta * last_variance;
    for _ in 0..horizon {
        out.push(next);
        next = params.omega + params.persistence() * next;
    }
    out
}

/// Best point of a small (α, persistence) grid with ω set by variance
/// targeting.
fn starting_point(shocks: &[f64], mean_square: f64, backcast: f64) -> GarchParams {
    const ALPHAS: [f64; 4] = [0.01, 0.05, 0.1, 0.2];
    const PERSISTENCE: [f64; 4] = [0.5, 0.7, 0.9, 0.98];

    let mut best = GarchParams {
        omega: mean_square * 0.1,
        alpha: 0.05,
        beta: 0.85,
    };
    let mut best_value = negative_log_likelihood(&best, shocks, backcast);

    for alpha in ALPHAS {
        for persistence in PERSISTENCE {
            let beta = persistence - alpha;
            if beta <= 0.0 {
                continue;
            }
            let candidate = GarchParams {
                omega: mean_square * (1.0 - persistence),
                alpha,
                beta,
            };
            let value = negative_log_likelihood(&candidate, shocks, backcast);
            if value < best_value {
                best = candidate;
                best_value = value;
            }
        }
    }
    best
}
