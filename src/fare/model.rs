use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Raw model output: a bare scalar or any depth of nested lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelOutput {
    Scalar(f64),
    List(Vec<ModelOutput>),
}

impl ModelOutput {
    /// First scalar in depth-first order, if any
    pub fn first_scalar(&self) -> Option<f64> {
        match self {
            ModelOutput::Scalar(value) => Some(*value),
            ModelOutput::List(items) => items.iter().find_map(ModelOutput::first_scalar),
        }
    }
}

impl From<f64> for ModelOutput {
    fn from(value: f64) -> Self {
        ModelOutput::Scalar(value)
    }
}

impl From<Vec<f64>> for ModelOutput {
    fn from(values: Vec<f64>) -> Self {
        ModelOutput::List(values.into_iter().map(ModelOutput::Scalar).collect())
    }
}

/// A pre-trained regression model. Loaded once, shared read-only.
pub trait FareModel: Send + Sync {
    /// Run inference over a feature matrix (one row per trip).
    fn predict(&self, rows: &[Vec<f64>]) -> AppResult<ModelOutput>;

    /// Number of features each row must have, when the model knows it
    fn expected_features(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str;
}

/// Ordinary least squares model serialized as JSON:
/// `{ "intercept": 12.5, "coefficients": [3.1, 0.2, -0.4, 1.0] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl LinearRegressionModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            source: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();

        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::ModelUnavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut model: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::ModelUnavailable(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if model.coefficients.is_empty() {
            return Err(AppError::ModelUnavailable(format!(
                "{} has no coefficients",
                path.display()
            )));
        }

        model.source = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            features = model.coefficients.len(),
            "Loaded linear regression model"
        );

        Ok(model)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl FareModel for LinearRegressionModel {
    fn predict(&self, rows: &[Vec<f64>]) -> AppResult<ModelOutput> {
        let predictions = rows
            .iter()
            .map(|row| {
                if row.len() != self.coefficients.len() {
                    return Err(AppError::Prediction(format!(
                        "X has {} features, but the model is expecting {} features as input",
                        row.len(),
                        self.coefficients.len()
                    )));
                }

                Ok(self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(x, w)| x * w)
                        .sum::<f64>())
            })
            .collect::<AppResult<Vec<f64>>>()?;

        Ok(predictions.into())
    }

    fn expected_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn name(&self) -> &str {
        "linear_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_artifact(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_first_scalar_any_depth() {
        let scalar = ModelOutput::Scalar(42.5);
        let flat: ModelOutput = serde_json::from_str("[42.5]").unwrap();
        let nested: ModelOutput = serde_json::from_str("[[42.5]]").unwrap();
        let deep: ModelOutput = serde_json::from_str("[[], [[42.5, 1.0]], 3.0]").unwrap();

        for output in [scalar, flat, nested, deep] {
            assert_eq!(output.first_scalar(), Some(42.5));
        }

        let empty: ModelOutput = serde_json::from_str("[[]]").unwrap();
        assert_eq!(empty.first_scalar(), None);
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearRegressionModel::new(2.0, vec![1.5, 0.5, 0.0, 1.0]);
        let output = model
            .predict(&[vec![10.0, 12.0, 4.0, 1.0], vec![0.0, 0.0, 0.0, 0.0]])
            .unwrap();

        assert_eq!(output, ModelOutput::from(vec![24.0, 2.0]));
    }

    #[test]
    fn test_shape_mismatch_is_prediction_error() {
        let model = LinearRegressionModel::new(0.0, vec![1.0; 4]);
        let err = model.predict(&[vec![1.0; 7]]).unwrap_err();

        match err {
            AppError::Prediction(msg) => assert!(msg.contains("7 features")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let file = write_artifact(r#"{ "intercept": 1.0, "coefficients": [2.0, 3.0] }"#);
        let model = LinearRegressionModel::load(file.path()).unwrap();

        assert_eq!(model.intercept, 1.0);
        assert_eq!(model.expected_features(), Some(2));
        assert_eq!(model.source(), Some(file.path()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LinearRegressionModel::load("definitely/not/here/lrmodel.json").unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        for contents in ["not json", r#"{ "intercept": 1.0, "coefficients": [] }"#] {
            let file = write_artifact(contents);
            let err = LinearRegressionModel::load(file.path()).unwrap_err();
            assert!(matches!(err, AppError::ModelUnavailable(_)));
        }
    }
}
