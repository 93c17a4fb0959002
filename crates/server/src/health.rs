//! Liveness and model-registry status

use axum::{extract::State, response::Json};
use chrono::Utc;
use inference::RegistryStatus;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::api::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// `ok` when models are loaded, `degraded` otherwise
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub models: RegistryStatus,
}

/// Process identity reported by `/health`
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub start_time: Instant,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let models = state.service.registry().status();

    Json(HealthStatus {
        status: if models.loaded { "ok" } else { "degraded" }.to_string(),
        service: state.info.name.clone(),
        version: state.info.version.clone(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.info.uptime_seconds(),
        models,
    })
}
