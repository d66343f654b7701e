use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fare_estimator::{
    config::Config,
    fare::{FareEstimator, FarePredictor, LinearRegressionModel, ModelState},
    middleware::rate_limit::{create_global_governor, with_rate_limit},
    routes, AppError, AppResult, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fare_estimator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        schema = %config.feature_schema,
        model = %config.model_path.display(),
        "Starting fare estimator at {}",
        config.server_addr()
    );

    // Load the model once; a missing artifact degrades the service instead of stopping it
    let model = load_model(&config);
    let estimator = FareEstimator::new(config.feature_schema, config.default_day_of_week, model);

    let state = AppState {
        estimator,
        config: config.clone(),
    };

    let governor = create_global_governor(config.rate_limit_per_ms, config.rate_limit_burst)?;

    // Create router with middleware
    let app = with_rate_limit(routes::create_router(state), governor)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}

fn load_model(config: &Config) -> ModelState {
    match LinearRegressionModel::load(&config.model_path) {
        Ok(model) => {
            tracing::info!(
                features = model.coefficients.len(),
                "Model loaded from {}",
                config.model_path.display()
            );
            ModelState::Ready(FarePredictor::new(Arc::new(model)))
        }
        Err(e) => {
            tracing::error!("{}; estimates are disabled until restart", e);
            let reason = match e {
                AppError::ModelUnavailable(reason) => reason,
                other => other.to_string(),
            };
            ModelState::Unavailable(reason)
        }
    }
}
