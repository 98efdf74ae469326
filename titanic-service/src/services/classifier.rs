//! Trained classifier loaded from a JSON artifact at startup.
//!
//! The artifact is produced by an external training job. Three model shapes
//! are understood: logistic regression, a single decision tree, and a forest
//! of trees voting on the label.

use crate::models::{FeatureVector, Label, Prediction, PredictionError, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Anything that can turn a feature vector into a survival label.
///
/// Implementations are shared read-only across all request handlers.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, PredictionError>;
}

/// Labels a binary survival classifier may emit.
const CLASS_LABELS: [Label; 2] = [0, 1];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: TreeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        label: Label,
    },
    /// Samples with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        artifact.validate()?;
        Ok(artifact)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::LogisticRegression(model) => model.validate(),
            ModelArtifact::DecisionTree(tree) => tree.validate(),
            ModelArtifact::RandomForest(forest) => forest.validate(),
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, PredictionError> {
        let sample = features.values();

        if let Some(index) = sample.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::NonFiniteFeature {
                index,
                name: FEATURE_NAMES[index],
            });
        }

        let label = match self {
            ModelArtifact::LogisticRegression(model) => model.predict_sample(sample),
            ModelArtifact::DecisionTree(tree) => tree.predict_sample(sample),
            ModelArtifact::RandomForest(forest) => forest.predict_sample(sample),
        };

        Ok(Prediction::new(label))
    }
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), ModelError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "logistic regression expects {} weights, found {}",
                FEATURE_COUNT,
                self.weights.len()
            )));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::Invalid(
                "logistic regression coefficients must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn predict_proba(&self, sample: &[f64; FEATURE_COUNT]) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(sample.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;

        1.0 / (1.0 + (-z).exp())
    }

    fn predict_sample(&self, sample: &[f64; FEATURE_COUNT]) -> Label {
        if self.predict_proba(sample) >= 0.5 {
            1
        } else {
            0
        }
    }
}

impl DecisionTree {
    fn validate(&self) -> Result<(), ModelError> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::Leaf { label } => {
                    if !CLASS_LABELS.contains(label) {
                        return Err(ModelError::Invalid(format!(
                            "leaf label {} is not a binary class (expected 0 or 1)",
                            label
                        )));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ModelError::Invalid(format!(
                            "split on feature {} but only {} features exist",
                            feature, FEATURE_COUNT
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::Invalid(format!(
                            "split on feature {} has a NaN threshold",
                            feature
                        )));
                    }
                    stack.push(&**left);
                    stack.push(&**right);
                }
            }
        }
        Ok(())
    }

    fn predict_sample(&self, sample: &[f64; FEATURE_COUNT]) -> Label {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }
}

impl RandomForest {
    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid(
                "random forest contains no trees".to_string(),
            ));
        }
        self.trees.iter().try_for_each(DecisionTree::validate)
    }

    /// Majority vote over the trees; a tie goes to "did not survive".
    fn predict_sample(&self, sample: &[f64; FEATURE_COUNT]) -> Label {
        let votes_for = self
            .trees
            .iter()
            .filter(|tree| tree.predict_sample(sample) == 1)
            .count();

        if votes_for * 2 > self.trees.len() {
            1
        } else {
            0
        }
    }
}
