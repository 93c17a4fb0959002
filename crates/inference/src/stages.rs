//! Ordered inference stages.
//!
//! Each stage names its model's declared inputs and, optionally, a feature
//! it adds to the row for later stages. The whole plan is checked against
//! the row before the first model is scored.

use market_data::{names, FeatureRow};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::model::ScoringModel;
use crate::registry::LoadedModels;
use crate::{InferenceError, Result};

/// How a stage's model output is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRole {
    /// Regression output is log-volatility
    Volatility,
    /// Positive-class probability is the bullish probability
    Direction,
}

#[derive(Debug, Clone)]
struct Stage {
    name: &'static str,
    role: StageRole,
    model: Arc<dyn ScoringModel>,
    /// Feature added to the row with this stage's output
    injects: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageOutputs {
    pub log_vol: f64,
    /// `exp(log_vol)`, decimal annualized
    pub predicted_vol: f64,
    pub bull_probability: f64,
}

#[derive(Debug, Clone)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    /// Volatility first; its output feeds the direction model as
    /// `Log_Pred_Vol`.
    pub fn standard(models: &LoadedModels) -> Self {
        Self {
            stages: vec![
                Stage {
                    name: "volatility",
                    role: StageRole::Volatility,
                    model: Arc::clone(&models.volatility),
                    injects: Some(names::LOG_PRED_VOL),
                },
                Stage {
                    name: "direction",
                    role: StageRole::Direction,
                    model: Arc::clone(&models.direction),
                    injects: None,
                },
            ],
        }
    }

    /// Check every stage's declared inputs against what the row will hold
    /// when that stage runs.
    pub fn validate(&self, row: &FeatureRow) -> Result<()> {
        let mut available: BTreeSet<&str> = row.iter().map(|(name, _)| name).collect();

        for stage in &self.stages {
            let missing: Vec<String> = stage
                .model
                .feature_names()
                .iter()
                .filter(|name| !available.contains(name.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(InferenceError::SchemaMismatch {
                    stage: stage.name.to_string(),
                    missing,
                });
            }
            if let Some(injected) = stage.injects {
                available.insert(injected);
            }
        }
        Ok(())
    }

    /// Validate, then score each stage in order on the latest row.
    pub fn run(&self, mut row: FeatureRow) -> Result<StageOutputs> {
        self.validate(&row)?;

        let mut log_vol = None;
        let mut bull_probability = None;

        for stage in &self.stages {
            let inputs = assemble(&row, stage)?;
            let value = match stage.role {
                StageRole::Volatility => stage.model.predict(&inputs),
                StageRole::Direction => stage.model.predict_proba(&inputs)[1],
            };
            if !value.is_finite() {
                return Err(InferenceError::NonFiniteOutput(stage.name.to_string()));
            }
            debug!(stage = stage.name, value, "Stage scored");

            if let Some(injected) = stage.injects {
                row.insert(injected, value);
            }
            match stage.role {
                StageRole::Volatility => log_vol = Some(value),
                StageRole::Direction => bull_probability = Some(value),
            }
        }

        match (log_vol, bull_probability) {
            (Some(log_vol), Some(bull_probability)) => {
                let predicted_vol = log_vol.exp();
                if !predicted_vol.is_finite() {
                    return Err(InferenceError::NonFiniteOutput("volatility".to_string()));
                }
                Ok(StageOutputs {
                    log_vol,
                    predicted_vol,
                    bull_probability,
                })
            }
            _ => Err(InferenceError::NonFiniteOutput("plan".to_string())),
        }
    }
}

/// Feature vector in the model's declared order
fn assemble(row: &FeatureRow, stage: &Stage) -> Result<Vec<f64>> {
    let names = stage.model.feature_names();
    let mut values = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match row.get(name) {
            Some(v) => values.push(v),
            None => missing.push(name.clone()),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(InferenceError::SchemaMismatch {
            stage: stage.name.to_string(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed value and counts calls
    #[derive(Debug)]
    struct Fixed {
        names: Vec<String>,
        value: f64,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(names: &[&str], value: f64) -> Arc<Self> {
            Arc::new(Self {
                names: names.iter().map(|s| s.to_string()).collect(),
                value,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ScoringModel for Fixed {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict(&self, _features: &[f64]) -> f64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value
        }
    }

    /// Echoes its last input as the probability
    #[derive(Debug)]
    struct Echo(Vec<String>);

    impl ScoringModel for Echo {
        fn feature_names(&self) -> &[String] {
            &self.0
        }

        fn predict(&self, features: &[f64]) -> f64 {
            features.last().copied().unwrap_or(f64::NAN)
        }
    }

    fn row(values: &[(&str, f64)]) -> FeatureRow {
        let mut row = FeatureRow::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        for (k, v) in values {
            row.insert(k, *v);
        }
        row
    }

    #[test]
    fn test_two_stage_chain() {
        let vol = Fixed::new(&["HV_20", "Log_GARCH_Vol"], (0.25f64).ln());
        let dir = Fixed::new(&["Ret_5", "Log_Pred_Vol"], 0.72);
        let plan = StagePlan::standard(&LoadedModels {
            volatility: vol,
            direction: dir,
        });

        let out = plan
            .run(row(&[("HV_20", 0.2), ("Log_GARCH_Vol", -1.5), ("Ret_5", 0.01)]))
            .unwrap();
        assert!((out.predicted_vol - 0.25).abs() < 1e-12);
        assert!((out.bull_probability - 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_injected_feature_reaches_direction_stage() {
        let vol = Fixed::new(&["HV_20"], -1.2);
        let dir: Arc<dyn ScoringModel> = Arc::new(Echo(vec!["HV_20".into(), "Log_Pred_Vol".into()]));
        let plan = StagePlan::standard(&LoadedModels {
            volatility: vol,
            direction: dir,
        });

        let out = plan.run(row(&[("HV_20", 0.2)])).unwrap();
        assert!((out.bull_probability + 1.2).abs() < 1e-12);
        assert!((out.log_vol + 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_missing_direction_input_fails_before_any_model_runs() {
        let vol = Fixed::new(&["HV_20"], -1.2);
        let dir = Fixed::new(&["Ret_5", "Log_Pred_Vol"], 0.5);
        let plan = StagePlan::standard(&LoadedModels {
            volatility: vol.clone(),
            direction: dir.clone(),
        });

        let err = plan.run(row(&[("HV_20", 0.2)])).unwrap_err();
        assert_matches!(
            err,
            InferenceError::SchemaMismatch { ref stage, ref missing }
                if stage == "direction" && missing == &vec!["Ret_5".to_string()]
        );
        assert_eq!(vol.calls.load(Ordering::SeqCst), 0);
        assert_eq!(dir.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_volatility_inputs_listed() {
        let vol = Fixed::new(&["HV_20", "Price_vs_SMA50", "Log_GARCH_Vol"], -1.2);
        let dir = Fixed::new(&["Log_Pred_Vol"], 0.5);
        let plan = StagePlan::standard(&LoadedModels {
            volatility: vol,
            direction: dir,
        });

        let err = plan.validate(&row(&[("HV_20", 0.2)])).unwrap_err();
        assert_eq!(
            err,
            InferenceError::SchemaMismatch {
                stage: "volatility".to_string(),
                missing: vec!["Price_vs_SMA50".to_string(), "Log_GARCH_Vol".to_string()],
            }
        );
    }

    #[test]
    fn test_non_finite_output_is_an_error() {
        let vol = Fixed::new(&["HV_20"], f64::NAN);
        let dir = Fixed::new(&["Log_Pred_Vol"], 0.5);
        let plan = StagePlan::standard(&LoadedModels {
            volatility: vol,
            direction: dir,
        });

        assert_matches!(
            plan.run(row(&[("HV_20", 0.2)])),
            Err(InferenceError::NonFiniteOutput(_))
        );
    }
}
