use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let substituted = substitution::substitute_env_vars(&content)?;
    debug!("Environment variable substitution completed");

    let config: AppConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> AppConfig {
    AppConfig {
        service: ServiceConfig {
            name: "volregime".to_string(),
            version: default_version(),
        },
        data: DataConfig {
            primary_csv: "./data/combined_sorted_data.csv".into(),
            volatility_csv: "./data/combined_sorted_vix.csv".into(),
        },
        models: ModelsConfig {
            vol_model: "./models/vol_model.json".into(),
            dir_model: "./models/dir_model.json".into(),
            vol_features: "./models/vol_features.json".into(),
            dir_features: "./models/dir_features.json".into(),
        },
        forecaster: ForecasterConfig::default(),
        server: HttpConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volregime.yaml");

        let config = generate_default_config();
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.service.name, "volregime");
        assert_eq!(loaded.forecaster.window, 1000);
        assert_eq!(loaded.server.port, 8000);
        assert_eq!(loaded.models.dir_features, config.models.dir_features);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_substitutes_environment() {
        std::env::set_var("VOLREGIME_TEST_MODEL_DIR", "/opt/models");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volregime.yaml");
        fs::write(
            &path,
            r#"
service:
  name: "volregime"
data:
  primary_csv: "a.csv"
  volatility_csv: "b.csv"
models:
  vol_model: "${VOLREGIME_TEST_MODEL_DIR}/vol.json"
  dir_model: "${VOLREGIME_TEST_MODEL_DIR}/dir.json"
  vol_features: "${VOLREGIME_TEST_MODEL_DIR}/vol_features.json"
  dir_features: "${VOLREGIME_TEST_MODEL_DIR}/dir_features.json"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.models.vol_model, Path::new("/opt/models/vol.json"));
    }
}
