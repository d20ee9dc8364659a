pub mod error;
pub mod handlers;
pub mod state;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::ApiState;

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/prices", get(handlers::get_prices))
        .route("/predict", get(handlers::get_predict))
        .route("/status", get(handlers::get_status))
        // The dashboard is served from another origin.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
