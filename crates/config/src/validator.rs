use crate::*;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("{field} must not be empty")]
    EmptyPath { field: String },

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} must be a positive float")]
    InvalidPositiveFloat { field: String },

    #[error("Forecaster: {message}")]
    InvalidForecaster { message: String },

    #[error("Invalid log format '{0}'. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Metrics port {0} collides with the HTTP port")]
    MetricsPortCollision(u16),

    #[error("Environment variable placeholder left unresolved in {field}")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Static checks plus existence checks on every configured file.
///
/// Missing model artifacts are warnings, not errors: the service still
/// starts and answers prediction requests with "unavailable".
pub fn validate_config(config: &AppConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_data(&config.data, &mut report);
    validate_models(&config.models, &mut report);
    validate_forecaster(&config.forecaster, &mut report);
    validate_observability(config, &mut report);

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }

    let version_ok = Regex::new(r"^\d+\.\d+\.\d+$")
        .map(|re| re.is_match(&service.version))
        .unwrap_or(false);
    if !version_ok {
        report.add_error(ValidationError::InvalidVersionFormat(service.version.clone()));
    }
}

fn check_path(field: &str, path: &Path, report: &mut ValidationReport) -> bool {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        report.add_error(ValidationError::EmptyPath {
            field: field.to_string(),
        });
        return false;
    }
    if has_unresolved_env_vars(&text) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: field.to_string(),
        });
        return false;
    }
    true
}

fn validate_data(data: &DataConfig, report: &mut ValidationReport) {
    for (field, path) in [
        ("data.primary_csv", &data.primary_csv),
        ("data.volatility_csv", &data.volatility_csv),
    ] {
        if check_path(field, path, report) && !path.exists() {
            report.add_warning(field, "File does not exist yet; it will be created with headers only");
        }
    }
}

fn validate_models(models: &ModelsConfig, report: &mut ValidationReport) {
    for (field, path) in [
        ("models.vol_model", &models.vol_model),
        ("models.dir_model", &models.dir_model),
        ("models.vol_features", &models.vol_features),
        ("models.dir_features", &models.dir_features),
    ] {
        if check_path(field, path, report) && !path.exists() {
            report.add_warning(field, "File not found; prediction will be disabled");
        }
    }
}

fn validate_forecaster(forecaster: &ForecasterConfig, report: &mut ValidationReport) {
    for (field, value) in [
        ("forecaster.window", forecaster.window),
        ("forecaster.horizon", forecaster.horizon),
        ("forecaster.min_observations", forecaster.min_observations),
        ("forecaster.max_iterations", forecaster.max_iterations),
    ] {
        if value == 0 {
            report.add_error(ValidationError::InvalidPositiveInteger {
                field: field.to_string(),
            });
        }
    }

    if !(forecaster.tolerance.is_finite() && forecaster.tolerance > 0.0) {
        report.add_error(ValidationError::InvalidPositiveFloat {
            field: "forecaster.tolerance".to_string(),
        });
    }

    if forecaster.timeout_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "forecaster.timeout_seconds".to_string(),
        });
    }

    if forecaster.min_observations > forecaster.window {
        report.add_error(ValidationError::InvalidForecaster {
            message: format!(
                "min_observations ({}) exceeds window ({})",
                forecaster.min_observations, forecaster.window
            ),
        });
    }

    if forecaster.window != default_garch_window() {
        report.add_warning(
            "forecaster.window",
            "Models were trained against a 1000-day GARCH window",
        );
    }
    if forecaster.horizon != default_garch_horizon() {
        report.add_warning(
            "forecaster.horizon",
            "Models were trained against a 5-day GARCH horizon",
        );
    }
}

fn validate_observability(config: &AppConfig, report: &mut ValidationReport) {
    let format = config.observability.log_format.to_lowercase();
    if !["pretty", "json", "compact"].contains(&format.as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    match config.observability.metrics_port {
        Some(port) if port == config.server.port => {
            report.add_error(ValidationError::MetricsPortCollision(port));
        }
        Some(_) => {}
        None => report.add_default("observability.metrics_port", "disabled"),
    }

    if config.server.cors_allow_any_origin {
        report.add_warning("server.cors_allow_any_origin", "Any browser origin may call the API");
    }
}
