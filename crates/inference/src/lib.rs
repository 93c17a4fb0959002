//! Model inference for VolRegime
//!
//! # Core Components
//!
//! - [`model`] - gradient-boosted tree ensembles read from JSON dumps
//! - [`registry`] - the two models, loaded once at startup
//! - [`stages`] - ordered two-stage plan (volatility, then direction)
//!
//! # Key Invariants
//!
//! - The registry is immutable after load and shared read-only
//! - A failed load disables prediction; it is never retried
//! - Every stage's inputs are checked before any model runs

pub mod error;
pub mod model;
pub mod registry;
pub mod stages;

pub use error::InferenceError;
pub use model::{Objective, ScoringModel, TreeEnsemble};
pub use registry::{LoadedModels, ModelPaths, ModelRegistry, RegistryStatus};
pub use stages::{StageOutputs, StagePlan, StageRole};

pub type Result<T> = std::result::Result<T, InferenceError>;
