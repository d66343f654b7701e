use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{estimate, model};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(model::health))
        .route("/model", get(model::model_info))
        .route("/estimate", post(estimate::estimate_fare));

    Router::new().nest("/api", api_routes).with_state(state)
}
