use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::fare::features::FeatureVector;
use crate::fare::model::{FareModel, ModelOutput};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FareOutcome {
    Fare { amount: f64 },
    /// Negative predictions usually mean degenerate trip geometry
    NegativeFareWarning { amount: f64 },
}

impl FareOutcome {
    pub fn classify(amount: f64) -> Self {
        if amount < 0.0 {
            FareOutcome::NegativeFareWarning { amount }
        } else {
            FareOutcome::Fare { amount }
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            FareOutcome::Fare { amount } | FareOutcome::NegativeFareWarning { amount } => *amount,
        }
    }
}

#[derive(Clone)]
pub struct FarePredictor {
    model: Arc<dyn FareModel>,
}

impl FarePredictor {
    pub fn new(model: Arc<dyn FareModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn expected_features(&self) -> Option<usize> {
        self.model.expected_features()
    }

    /// Run the model on a single feature vector and unwrap its output to a scalar.
    pub fn predict(&self, features: &FeatureVector) -> AppResult<f64> {
        let output = self.model.predict(std::slice::from_ref(&features.values))?;
        let amount = normalize(&output)?;

        tracing::debug!(
            model = self.model.name(),
            features = ?features.values,
            amount,
            "Model prediction"
        );

        Ok(amount)
    }

    pub fn classify(&self, features: &FeatureVector) -> AppResult<FareOutcome> {
        self.predict(features).map(FareOutcome::classify)
    }
}

/// Take the first scalar out of a possibly nested model output.
pub fn normalize(output: &ModelOutput) -> AppResult<f64> {
    let value = output
        .first_scalar()
        .ok_or_else(|| AppError::Prediction("Model returned no output".to_string()))?;

    if !value.is_finite() {
        return Err(AppError::Prediction(format!(
            "Model returned a non-finite value: {}",
            value
        )));
    }

    Ok(value)
}
