use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::*;
use super::AppState;
use crate::health::health_handler;

pub fn create_router(state: Arc<AppState>, cors_allow_any_origin: bool) -> Router {
    let router = Router::new()
        .route("/predict", get(predict))
        .route("/feed/nifty", post(feed_nifty))
        .route("/feed/vix", post(feed_vix))
        .route("/data/nifty", get(data_nifty))
        .route("/data/vix", get(data_vix))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any_origin {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
