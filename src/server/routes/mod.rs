use crate::server::router::AppState;
use axum::{Router, routing::post};

pub mod extract;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/design", post(handlers::design_handler))
        .route("/build", post(handlers::build_handler))
        .route("/sample-data", post(handlers::sample_data_handler))
        .route("/analyze", post(handlers::analyze_handler))
        .route("/workflow", post(handlers::workflow_handler))
}
