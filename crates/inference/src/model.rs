//! Gradient-boosted tree ensembles.
//!
//! An artifact is a JSON object wrapping the per-tree JSON dump that
//! boosting libraries emit:
//!
//! ```json
//! {
//!   "objective": "binary:logistic",
//!   "base_score": 0.5,
//!   "trees": [
//!     { "nodeid": 0, "split": "Ret_5", "split_condition": 0.01,
//!       "yes": 1, "no": 2, "missing": 1,
//!       "children": [ { "nodeid": 1, "leaf": -0.2 }, { "nodeid": 2, "leaf": 0.3 } ] }
//!   ]
//! }
//! ```
//!
//! A row goes to `yes` when `value < split_condition` and to `missing` when
//! the value is NaN. Split names may be feature names or positional `f<N>`.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::{InferenceError, Result};

/// A scored function over a named, ordered feature vector
pub trait ScoringModel: Send + Sync + fmt::Debug {
    /// Declared inputs, in the order `predict` expects them
    fn feature_names(&self) -> &[String];

    /// Raw output: the regression value, or the positive-class probability
    /// for a classifier. NaN inputs follow the missing-value branch.
    fn predict(&self, features: &[f64]) -> f64;

    /// `[negative, positive]` class probabilities
    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        let p = self.predict(features);
        [1.0 - p, p]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Objective {
    #[serde(rename = "reg:squarederror")]
    SquaredError,
    #[serde(rename = "binary:logistic")]
    Logistic,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    objective: Objective,
    #[serde(default = "default_base_score")]
    base_score: f64,
    trees: Vec<RawNode>,
}

fn default_base_score() -> f64 {
    0.5
}

#[derive(Debug, Deserialize)]
struct RawNode {
    nodeid: u32,
    split: Option<String>,
    split_condition: Option<f64>,
    yes: Option<u32>,
    no: Option<u32>,
    missing: Option<u32>,
    #[serde(default)]
    children: Vec<RawNode>,
    leaf: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f64),
}

/// Flattened tree; index 0 is the root
#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn score(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        // Children always sit after their parent, so this terminates
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if value.is_nan() {
                        *missing
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    objective: Objective,
    base_score: f64,
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Read a model artifact and its JSON feature-name list.
    pub fn load(model_path: &Path, features_path: &Path) -> Result<Self> {
        let features_text = read(features_path)?;
        let feature_names: Vec<String> =
            serde_json::from_str(&features_text).map_err(|e| InferenceError::InvalidArtifact {
                path: features_path.to_path_buf(),
                message: format!("feature list: {}", e),
            })?;

        let model_text = read(model_path)?;
        Self::from_json(&model_text, feature_names).map_err(|message| {
            InferenceError::InvalidArtifact {
                path: model_path.to_path_buf(),
                message,
            }
        })
    }

    /// Build from artifact JSON; errors describe what is wrong.
    pub fn from_json(json: &str, feature_names: Vec<String>) -> std::result::Result<Self, String> {
        let raw: RawArtifact = serde_json::from_str(json).map_err(|e| e.to_string())?;

        if feature_names.is_empty() {
            return Err("feature list is empty".to_string());
        }
        if raw.trees.is_empty() {
            return Err("artifact contains no trees".to_string());
        }
        let logistic_out_of_range = raw.objective == Objective::Logistic
            && !(raw.base_score > 0.0 && raw.base_score < 1.0);
        if !raw.base_score.is_finite() || logistic_out_of_range {
            return Err(format!("base_score {} is invalid for {:?}", raw.base_score, raw.objective));
        }

        let lookup: HashMap<&str, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let trees = raw
            .trees
            .iter()
            .enumerate()
            .map(|(i, root)| {
                let mut nodes = Vec::new();
                flatten(root, &lookup, feature_names.len(), &mut nodes)
                    .map_err(|e| format!("tree {}: {}", i, e))?;
                Ok(Tree { nodes })
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        Ok(Self {
            objective: raw.objective,
            base_score: raw.base_score,
            feature_names,
            trees,
        })
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Untransformed sum: base margin plus every tree's leaf
    pub fn margin(&self, features: &[f64]) -> f64 {
        let base = match self.objective {
            Objective::SquaredError => self.base_score,
            Objective::Logistic => (self.base_score / (1.0 - self.base_score)).ln(),
        };
        base + self.trees.iter().map(|t| t.score(features)).sum::<f64>()
    }
}

impl ScoringModel for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> f64 {
        let margin = self.margin(features);
        match self.objective {
            Objective::SquaredError => margin,
            Objective::Logistic => 1.0 / (1.0 + (-margin).exp()),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| InferenceError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn resolve_feature(name: &str, lookup: &HashMap<&str, usize>, count: usize) -> Option<usize> {
    if let Some(index) = lookup.get(name) {
        return Some(*index);
    }
    name.strip_prefix('f')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|i| *i < count)
}

/// Depth-first copy into `nodes`, returning the index of `node`.
fn flatten(
    node: &RawNode,
    lookup: &HashMap<&str, usize>,
    feature_count: usize,
    nodes: &mut Vec<Node>,
) -> std::result::Result<usize, String> {
    let index = nodes.len();

    if let Some(leaf) = node.leaf {
        if !leaf.is_finite() {
            return Err(format!("node {} has a non-finite leaf", node.nodeid));
        }
        nodes.push(Node::Leaf(leaf));
        return Ok(index);
    }

    let split = node
        .split
        .as_deref()
        .ok_or_else(|| format!("node {} has neither leaf nor split", node.nodeid))?;
    let feature = resolve_feature(split, lookup, feature_count)
        .ok_or_else(|| format!("node {} splits on undeclared feature '{}'", node.nodeid, split))?;
    let threshold = node
        .split_condition
        .filter(|t| !t.is_nan())
        .ok_or_else(|| format!("node {} has no split_condition", node.nodeid))?;
    let (yes, no) = match (node.yes, node.no) {
        (Some(yes), Some(no)) => (yes, no),
        _ => return Err(format!("node {} is missing yes/no", node.nodeid)),
    };
    let missing = node.missing.unwrap_or(yes);

    // Reserve the slot, then place children after it
    nodes.push(Node::Leaf(0.0));
    let mut child_index = HashMap::new();
    for child in &node.children {
        let at = flatten(child, lookup, feature_count, nodes)?;
        child_index.insert(child.nodeid, at);
    }

    let resolve = |id: u32| {
        child_index
            .get(&id)
            .copied()
            .ok_or_else(|| format!("node {} refers to unknown child {}", node.nodeid, id))
    };
    nodes[index] = Node::Split {
        feature,
        threshold,
        yes: resolve(yes)?,
        no: resolve(no)?,
        missing: resolve(missing)?,
    };
    Ok(index)
}
