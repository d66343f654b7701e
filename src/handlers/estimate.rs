use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::fare::{FareOutcome, FeatureSchema, TripRequest};
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub outcome: FareOutcome,
    pub fare: Option<f64>,
    pub message: String,
    pub warning: Option<String>,
    pub distance_km: Option<f64>,
    pub distance_message: Option<String>,
    pub schema: FeatureSchema,
    pub features: Vec<f64>,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub timestamp: DateTime<Utc>,
}

/// Estimate the fare for a single trip
pub async fn estimate_fare(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> AppResult<Json<EstimateResponse>> {
    let Json(payload) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        hour = payload.hour,
        passengers = payload.passengers,
        "Fare estimate requested"
    );

    let estimate = state.estimator.estimate(&payload)?;
    tracing::info!(%request_id, amount = estimate.outcome.amount(), "Fare estimated");

    Ok(Json(EstimateResponse {
        request_id,
        outcome: estimate.outcome,
        fare: estimate.fare(),
        message: estimate.display(&state.config.currency_symbol),
        warning: estimate.warning(),
        distance_km: estimate.distance_km(),
        distance_message: estimate.distance_display(),
        schema: state.estimator.schema(),
        features: estimate.features.values,
        pickup: estimate.pickup,
        dropoff: estimate.dropoff,
        timestamp: Utc::now(),
    }))
}
