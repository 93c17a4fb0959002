//! VolRegime CLI and server binary
//!
//! Loads configuration, opens the series store, loads the two model
//! artifacts once, then either serves HTTP or runs a single prediction.

use anyhow::{Context, Result};
use cli::{Cli, Commands, LogFormatArg};
use config::{generate_default_config, load_config, save_config, validate_config, AppConfig};
use inference::{ModelPaths, ModelRegistry};
use market_data::{GarchSettings, VolatilityForecaster};
use observability::{init_logging, init_metrics, LogFormat};
use prediction::PredictionService;
use server::{create_router, AppState, HttpServer, ServerConfig, ServerExt, ServiceInfo};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::{CsvSeriesStore, SeriesStore};
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "volregime";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Serve { config, host, port } => {
            let app_config = bootstrap(&config, cli.log_format)?;
            info!("Executing 'serve' command");
            serve_command(app_config, host, port).await
        }
        Commands::Predict { config, pretty } => {
            let app_config = bootstrap(&config, cli.log_format)?;
            info!("Executing 'predict' command");
            predict_command(app_config, pretty).await
        }
        Commands::Validate { config } => {
            start_logging(cli.log_format, None)?;
            info!("Executing 'validate' command");
            validate_command(config)
        }
        Commands::Init { output } => {
            start_logging(cli.log_format, None)?;
            info!("Executing 'init' command");
            init_command(output)
        }
    }
}

/// CLI flag wins, then the config file, then pretty.
fn resolve_log_format(flag: Option<LogFormatArg>, config: Option<&AppConfig>) -> LogFormat {
    flag.map(|f| f.as_str())
        .or_else(|| config.map(|c| c.observability.log_format.as_str()))
        .and_then(LogFormat::parse)
        .unwrap_or(LogFormat::Pretty)
}

fn start_logging(flag: Option<LogFormatArg>, config: Option<&AppConfig>) -> Result<()> {
    init_logging(SERVICE_NAME, resolve_log_format(flag, config))
}

/// Read the config, install logging, then validate.
///
/// Logging comes up even when the file is unreadable so load and
/// validation failures are reported through the subscriber. Errors abort
/// before anything starts.
fn bootstrap(path: &Path, flag: Option<LogFormatArg>) -> Result<AppConfig> {
    let loaded = load_config(path);
    start_logging(flag, loaded.as_ref().ok())?;

    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            error!(%e, path = ?path, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);
    if !report.is_valid() {
        for err in &report.errors {
            error!(%err, "Invalid configuration");
        }
        anyhow::bail!(
            "Configuration validation failed: {:?} ({} errors)",
            path,
            report.errors.len()
        );
    }

    Ok(config)
}

fn model_paths(config: &AppConfig) -> ModelPaths {
    ModelPaths {
        vol_model: config.models.vol_model.clone(),
        dir_model: config.models.dir_model.clone(),
        vol_features: config.models.vol_features.clone(),
        dir_features: config.models.dir_features.clone(),
    }
}

/// Open the store and load models; a failed model load leaves the
/// registry disabled rather than aborting startup.
fn build_service(config: &AppConfig) -> Result<PredictionService> {
    let store = CsvSeriesStore::new(&config.data.primary_csv, &config.data.volatility_csv);
    store
        .init()
        .with_context(|| format!("Failed to initialize series files under {:?}", config.data.primary_csv))?;
    let store: Arc<dyn SeriesStore> = Arc::new(store);

    let registry = ModelRegistry::load(&model_paths(config));
    if let ModelRegistry::Disabled { reason } = &registry {
        warn!(%reason, "Prediction disabled");
    }

    let f = &config.forecaster;
    let forecaster = VolatilityForecaster::new(GarchSettings {
        window: f.window,
        horizon: f.horizon,
        min_observations: f.min_observations,
        max_iterations: f.max_iterations,
        tolerance: f.tolerance,
    });

    Ok(PredictionService::new(
        store,
        Arc::new(registry),
        forecaster,
        Duration::from_secs(f.timeout_seconds),
    ))
}

async fn serve_command(config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(metrics_port) = config.observability.metrics_port {
        init_metrics(metrics_port)?;
        info!(metrics_port, "Prometheus exporter listening");
    }

    let service = build_service(&config)?;

    let server_config = ServerConfig::new(
        host.unwrap_or_else(|| config.server.host.clone()),
        port.unwrap_or(config.server.port),
    )
    .with_cors(config.server.cors_allow_any_origin);
    debug!(?server_config, "Server configuration");

    let state = AppState::new(
        service,
        ServiceInfo::new(config.service.name.clone(), config.service.version.clone()),
    );
    let app = create_router(state, server_config.cors_allow_any_origin);

    info!(
        service = %config.service.name,
        host = %server_config.host,
        port = server_config.http_port,
        "Starting server"
    );

    HttpServer::new(server_config, app).run_with_ctrl_c().await?;
    Ok(())
}

async fn predict_command(config: AppConfig, pretty: bool) -> Result<()> {
    let service = build_service(&config)?;

    let report = match service.predict().await {
        Ok(report) => report,
        Err(e) => {
            error!(%e, "Prediction failed");
            anyhow::bail!(e);
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}

fn validate_command(config_path: PathBuf) -> Result<()> {
    info!(path = ?config_path, "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {} {}", config.service.name, config.service.version);
    println!("Primary series: {:?}", config.data.primary_csv);
    println!("Volatility series: {:?}", config.data.volatility_csv);
    println!(
        "GARCH: window={} horizon={} timeout={}s",
        config.forecaster.window, config.forecaster.horizon, config.forecaster.timeout_seconds
    );
    println!("HTTP: {}:{}", config.server.host, config.server.port);

    Ok(())
}

fn init_command(output_path: PathBuf) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, &output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Place the series CSVs and model artifacts at the configured paths");
    println!("  2. Run 'volregime validate --config {:?}' to check configuration", output_path);
    println!("  3. Run 'volregime serve --config {:?}' to start the server", output_path);

    Ok(())
}
