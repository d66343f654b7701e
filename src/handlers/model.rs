use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::fare::FeatureSchema;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub name: String,
    pub path: String,
    pub schema: FeatureSchema,
    pub features: Vec<&'static str>,
    pub model_features: Option<usize>,
    pub default_day_of_week: u8,
}

/// Liveness check. Always answers, even when the model failed to load.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.estimator.model();

    Json(HealthResponse {
        status: if model.is_ready() { "ok" } else { "degraded" },
        model_loaded: model.is_ready(),
        model_error: model.predictor().err().map(|e| e.to_string()),
    })
}

/// Describe the loaded model and the feature schema it is fed
pub async fn model_info(State(state): State<AppState>) -> AppResult<Json<ModelInfoResponse>> {
    let predictor = state.estimator.model().predictor()?;
    let schema = state.estimator.schema();

    Ok(Json(ModelInfoResponse {
        name: predictor.model_name().to_string(),
        path: state.config.model_path.display().to_string(),
        schema,
        features: schema.feature_names().to_vec(),
        model_features: predictor.expected_features(),
        default_day_of_week: state.config.default_day_of_week,
    }))
}
