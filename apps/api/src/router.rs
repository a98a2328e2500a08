use std::sync::Arc;

use axum::{routing::get, Router};

use schedule_cell::router::schedule_routes;
use schedule_cell::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Agenda Clinic API is running!" }))
        .route("/health", get(|| async { "ok" }))
        .nest("/schedule", schedule_routes(state))
}
