//! Model module - Feature vector, booster loading and price prediction

pub mod booster;
pub mod features;
pub mod locator;
mod predictor;

pub use features::{FeatureVector, FEATURE_SPECS};
pub use locator::load_model;
pub use predictor::{PredictionResult, Predictor};
