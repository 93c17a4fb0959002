use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::model::{ScoringModel, TreeEnsemble};
use crate::{InferenceError, Result};

/// Where the two models and their feature lists live on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub vol_model: PathBuf,
    pub dir_model: PathBuf,
    pub vol_features: PathBuf,
    pub dir_features: PathBuf,
}

/// The volatility regressor and the direction classifier
#[derive(Debug, Clone)]
pub struct LoadedModels {
    pub volatility: Arc<dyn ScoringModel>,
    pub direction: Arc<dyn ScoringModel>,
}

/// Process-wide model set, built once before requests are served.
#[derive(Debug, Clone)]
pub enum ModelRegistry {
    Ready(LoadedModels),
    /// Loading failed; every prediction reports unavailable
    Disabled { reason: String },
}

/// Registry state as reported by health checks
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStatus {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModelRegistry {
    /// Load both artifacts. Never fails: a load error is logged and yields
    /// a disabled registry.
    pub fn load(paths: &ModelPaths) -> Self {
        info!("Loading model artifacts");
        let loaded = TreeEnsemble::load(&paths.vol_model, &paths.vol_features).and_then(|vol| {
            let dir = TreeEnsemble::load(&paths.dir_model, &paths.dir_features)?;
            Ok((vol, dir))
        });

        match loaded {
            Ok((volatility, direction)) => {
                info!(
                    vol_trees = volatility.tree_count(),
                    vol_features = volatility.feature_names().len(),
                    dir_trees = direction.tree_count(),
                    dir_features = direction.feature_names().len(),
                    "Model artifacts loaded"
                );
                Self::from_models(Arc::new(volatility), Arc::new(direction))
            }
            Err(e @ InferenceError::Io { .. }) => {
                warn!(error = %e, "Model files not found; prediction disabled");
                Self::disabled(e.to_string())
            }
            Err(e) => {
                error!(error = %e, "Failed to load model artifacts; prediction disabled");
                Self::disabled(e.to_string())
            }
        }
    }

    pub fn from_models(volatility: Arc<dyn ScoringModel>, direction: Arc<dyn ScoringModel>) -> Self {
        Self::Ready(LoadedModels {
            volatility,
            direction,
        })
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        Self::Disabled {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn models(&self) -> Result<&LoadedModels> {
        match self {
            Self::Ready(models) => Ok(models),
            Self::Disabled { reason } => Err(InferenceError::Unavailable(reason.clone())),
        }
    }

    pub fn status(&self) -> RegistryStatus {
        match self {
            Self::Ready(_) => RegistryStatus {
                loaded: true,
                reason: None,
            },
            Self::Disabled { reason } => RegistryStatus {
                loaded: false,
                reason: Some(reason.clone()),
            },
        }
    }
}
