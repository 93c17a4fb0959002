use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level configuration file layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub data: DataConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub forecaster: ForecasterConfig,
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

/// Location of the two stored daily series
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    pub primary_csv: PathBuf,
    pub volatility_csv: PathBuf,
}

/// Pre-built model artifacts and their declared feature lists
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Volatility regressor (outputs log-volatility)
    pub vol_model: PathBuf,
    /// Direction classifier (outputs bullish probability)
    pub dir_model: PathBuf,
    pub vol_features: PathBuf,
    pub dir_features: PathBuf,
}

/// GARCH(1,1) fit and forecast settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecasterConfig {
    /// Most recent returns used for the fit
    #[serde(default = "default_garch_window")]
    pub window: usize,
    /// Forecast horizon in trading days
    #[serde(default = "default_garch_horizon")]
    pub horizon: usize,
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Wall-clock limit for one fit on the worker pool
    #[serde(default = "default_fit_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            window: default_garch_window(),
            horizon: default_garch_horizon(),
            min_observations: default_min_observations(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            timeout_seconds: default_fit_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_enabled")]
    pub cors_allow_any_origin: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
            cors_allow_any_origin: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Prometheus listener; metrics are not exported when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            metrics_port: None,
        }
    }
}
