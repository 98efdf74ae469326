pub mod features;
pub mod prediction;

pub use features::{FeatureError, FeatureVector, PassengerForm, FEATURE_COUNT, FEATURE_NAMES};
pub use prediction::{Label, Prediction, PredictionError};
