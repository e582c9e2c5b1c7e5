//! Prediction Handler Module
//! Binds a feature vector to the loaded booster and converts the log-price output.

use crate::model::booster::{Booster, ModelError};
use crate::model::features::{group_thousands, FeatureVector};
use log::debug;
use std::sync::Arc;

/// Model output in log space and its dollar equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub log_price: f64,
    pub price: f64,
    pub inputs: FeatureVector,
}

impl PredictionResult {
    /// `$180,921` style rendering of the estimate.
    pub fn price_label(&self) -> String {
        format!("${}", group_thousands(self.price))
    }

    /// Characteristic/value rows of the downloadable estimate.
    pub fn report_rows(&self) -> Vec<(String, String)> {
        let mut rows = self.inputs.report_rows();
        rows.push(("Estimated price (log)".into(), format!("{:.4}", self.log_price)));
        rows.push(("Estimated price".into(), self.price_label()));
        rows
    }
}

/// Runs the shared booster on form inputs.
#[derive(Clone)]
pub struct Predictor {
    booster: Arc<Booster>,
}

impl Predictor {
    pub fn new(booster: Arc<Booster>) -> Self {
        Self { booster }
    }

    pub fn booster(&self) -> &Booster {
        &self.booster
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, ModelError> {
        let binding = self.booster.bind(&FeatureVector::names())?;
        let values = features.values();
        let row: Vec<f64> = binding.iter().map(|&i| values[i]).collect();

        let log_price = self.booster.predict_margin(&row)?;
        let price = log_price.exp_m1();
        debug!("Predicted log price {:.4} -> {:.0}", log_price, price);

        Ok(PredictionResult {
            log_price,
            price,
            inputs: features.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::booster::tests::NATIVE_MODEL;

    fn predictor() -> Predictor {
        let booster = Booster::from_json_str(NATIVE_MODEL, 0.5).unwrap();
        Predictor::new(Arc::new(booster))
    }

    #[test]
    fn price_is_expm1_of_log_output() {
        let result = predictor().predict(&FeatureVector::default()).unwrap();
        assert!((result.log_price - 11.15).abs() < 1e-9);
        assert!((result.price - 11.15f64.exp_m1()).abs() < 1e-6);
        assert!(result.price > 0.0);
    }

    #[test]
    fn same_inputs_same_output() {
        let p = predictor();
        let a = p.predict(&FeatureVector::default()).unwrap();
        let b = p.predict(&FeatureVector::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn lot_area_drives_the_stump() {
        let mut features = FeatureVector::default();
        *features.value_mut(0).unwrap() = 4000.0;
        let result = predictor().predict(&features).unwrap();
        assert!((result.log_price - 11.35).abs() < 1e-9);
    }

    #[test]
    fn report_has_inputs_and_both_estimates() {
        let result = predictor().predict(&FeatureVector::default()).unwrap();
        let rows = result.report_rows();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[10], ("Estimated price (log)".to_string(), "11.1500".to_string()));
        assert_eq!(rows[11].1, result.price_label());
        assert!(rows[11].1.starts_with('$'));
    }

    #[test]
    fn model_feature_outside_the_vector_is_a_mismatch() {
        let text = NATIVE_MODEL.replace("\"LotArea\"", "\"PoolArea\"");
        let booster = Booster::from_json_str(&text, 0.5).unwrap();
        let err = Predictor::new(Arc::new(booster))
            .predict(&FeatureVector::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::FeatureMismatch(name) if name == "PoolArea"));
    }
}
