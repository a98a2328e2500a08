use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

pub fn schedule_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Spreadsheet imports
        .route("/imports/fixed-schedule", post(handlers::import_fixed_schedule))
        .route("/imports/blockages", post(handlers::import_blockages))
        .route("/imports/professionals", post(handlers::import_professionals))
        // Professionals and their grids
        .route(
            "/professionals",
            get(handlers::list_professionals).post(handlers::register_professional),
        )
        .route("/professionals/{professional_id}", delete(handlers::remove_professional))
        .route("/professionals/{professional_id}/grid", post(handlers::regenerate_grid))
        .route("/professionals/{professional_id}/slots", get(handlers::professional_slots))
        // Availability queries
        .route("/availability", get(handlers::query_availability))
        .route("/availability/summary", get(handlers::availability_summary))
        // Units and rooms
        .route("/units", get(handlers::list_units).post(handlers::create_unit))
        .route("/units/{unit_id}/rooms", post(handlers::create_room))
        .route("/rooms/{room_id}/grid", post(handlers::generate_room_grid))
        .with_state(state)
}
