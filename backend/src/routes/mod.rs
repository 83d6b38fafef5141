//! Route definitions for the custom metric provider

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create service routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/compute/custom_metric", post(handlers::compute_custom_metric))
}
