use thiserror::Error;

/// Class label produced by the classifier. `1` means the passenger survived.
pub type Label = i64;

pub const SURVIVED: Label = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub label: Label,
}

impl Prediction {
    pub fn new(label: Label) -> Self {
        Self { label }
    }

    pub fn survived(&self) -> bool {
        self.label == SURVIVED
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("Input contains a non-finite value for feature {index} ({name})")]
    NonFiniteFeature { index: usize, name: &'static str },

    /// The classifier itself could not produce a label.
    #[error("Model failed to produce a prediction: {0}")]
    ModelFailure(String),
}
