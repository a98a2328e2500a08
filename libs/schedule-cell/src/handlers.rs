// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_utils::rows::ingest_rows;

use crate::models::{
    BlockageImportPayload, CreateRoomRequest, CreateUnitRequest, ImportError, ImportPayload,
    RegisterProfessionalRequest, SlotFilters,
};
use crate::services::{
    availability::AvailabilityService,
    blockages::BlockageService,
    fixed_schedule::FixedScheduleService,
    grid::{GridError, GridService},
    professionals::ProfessionalService,
    units::UnitService,
};
use crate::AppState;

// ==============================================================================
// ERROR MAPPING
// ==============================================================================

fn import_error(err: ImportError) -> AppError {
    match &err {
        ImportError::MissingColumns(_) | ImportError::NullProfessionalId(_) => {
            AppError::BadRequest(err.to_string())
        }
        ImportError::ConfirmationRequired(details) => {
            AppError::Conflict(format!("{}: {}", err, details.join("; ")))
        }
        ImportError::Store(_) => AppError::Database(err.to_string()),
    }
}

fn grid_error(err: GridError) -> AppError {
    match &err {
        GridError::ProfessionalNotFound(_) | GridError::RoomNotFound(_) => {
            AppError::NotFound(err.to_string())
        }
        GridError::ProfessionalInactive(_) => AppError::Conflict(err.to_string()),
        GridError::Store(_) => AppError::Database(err.to_string()),
    }
}

fn store_error(err: StoreError) -> AppError {
    match &err {
        StoreError::ProfessionalNotFound(_)
        | StoreError::UnitNotFound(_)
        | StoreError::RoomNotFound(_) => AppError::NotFound(err.to_string()),
        StoreError::DuplicateUnitName(_) => AppError::Conflict(err.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

fn check_row_limit(state: &AppState, rows: usize) -> Result<(), AppError> {
    if rows > state.config.max_import_rows {
        return Err(AppError::BadRequest(format!(
            "import has {} rows, the limit is {}",
            rows, state.config.max_import_rows
        )));
    }
    Ok(())
}

// ==============================================================================
// IMPORT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn import_fixed_schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImportPayload>,
) -> Result<Json<Value>, AppError> {
    check_row_limit(&state, payload.rows.len())?;
    let rows = ingest_rows(payload.rows);

    let service = FixedScheduleService::new(&state.store);
    let outcome = service.import(rows).map_err(import_error)?;
    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn import_blockages(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BlockageImportPayload>,
) -> Result<Json<Value>, AppError> {
    check_row_limit(&state, payload.rows.len())?;
    let rows = ingest_rows(payload.rows);

    let service = BlockageService::new(&state.store);
    let outcome = service
        .apply(rows, payload.confirm_invalid)
        .map_err(import_error)?;
    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn import_professionals(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImportPayload>,
) -> Result<Json<Value>, AppError> {
    check_row_limit(&state, payload.rows.len())?;
    let rows = ingest_rows(payload.rows);

    let service = ProfessionalService::new(&state.store);
    let outcome = service.import_registry(rows).map_err(import_error)?;
    Ok(Json(json!(outcome)))
}

// ==============================================================================
// PROFESSIONAL HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_professionals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let service = ProfessionalService::new(&state.store);
    let professionals = service.list();
    Ok(Json(json!({
        "professionals": professionals,
        "total": professionals.len()
    })))
}

#[axum::debug_handler]
pub async fn register_professional(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterProfessionalRequest>,
) -> Result<Json<Value>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "professional name must not be empty".to_string(),
        ));
    }

    let service = ProfessionalService::new(&state.store);
    let professional = service
        .register(request.id, &request.name, request.room_id)
        .map_err(store_error)?;
    Ok(Json(json!(professional)))
}

#[axum::debug_handler]
pub async fn remove_professional(
    State(state): State<Arc<AppState>>,
    Path(professional_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let service = ProfessionalService::new(&state.store);
    let removal = service.remove(professional_id).map_err(store_error)?;
    Ok(Json(json!({ "result": removal })))
}

#[axum::debug_handler]
pub async fn regenerate_grid(
    State(state): State<Arc<AppState>>,
    Path(professional_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let service = GridService::new(&state.store);
    let slots = service.regenerate(professional_id).map_err(grid_error)?;
    Ok(Json(json!({ "professional_id": professional_id, "slots": slots })))
}

#[axum::debug_handler]
pub async fn professional_slots(
    State(state): State<Arc<AppState>>,
    Path(professional_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let professionals = ProfessionalService::new(&state.store);
    if professionals.get(professional_id).is_none() {
        return Err(AppError::NotFound(format!(
            "professional {} not found",
            professional_id
        )));
    }

    let service = AvailabilityService::new(&state.store);
    let filters = SlotFilters {
        professional_id: Some(professional_id),
        ..SlotFilters::default()
    };
    let slots = service.query(&filters);
    Ok(Json(json!({ "slots": slots, "total": slots.len() })))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn query_availability(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<SlotFilters>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.store);
    let slots = service.query(&filters);
    Ok(Json(json!({ "slots": slots, "total": slots.len() })))
}

#[axum::debug_handler]
pub async fn availability_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.store);
    Ok(Json(json!(service.summary())))
}

// ==============================================================================
// UNIT AND ROOM HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_units(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let service = UnitService::new(&state.store);
    let units = service.list_units();
    Ok(Json(json!({ "units": units, "total": units.len() })))
}

#[axum::debug_handler]
pub async fn create_unit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUnitRequest>,
) -> Result<Json<Value>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "unit name must not be empty".to_string(),
        ));
    }

    let service = UnitService::new(&state.store);
    let unit = service
        .create_unit(&request.name, request.serves_saturday)
        .map_err(store_error)?;
    Ok(Json(json!(unit)))
}

#[axum::debug_handler]
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Path(unit_id): Path<i32>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Value>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "room name must not be empty".to_string(),
        ));
    }

    let service = UnitService::new(&state.store);
    let room = service
        .create_room(unit_id, &request.name)
        .map_err(store_error)?;
    Ok(Json(json!(room)))
}

#[axum::debug_handler]
pub async fn generate_room_grid(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let service = GridService::new(&state.store);
    let slots = service.regenerate_room(room_id).map_err(grid_error)?;
    Ok(Json(json!({ "room_id": room_id, "slots": slots })))
}
