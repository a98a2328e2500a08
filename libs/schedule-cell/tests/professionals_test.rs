// libs/schedule-cell/tests/professionals_test.rs

use std::collections::BTreeMap;

use schedule_cell::models::{ImportError, RemovalKind};
use schedule_cell::services::grid::GridService;
use schedule_cell::services::professionals::ProfessionalService;
use schedule_cell::services::units::UnitService;
use shared_database::ScheduleStore;
use shared_utils::rows::{ingest_rows, CellValue};

use assert_matches::assert_matches;

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn registry_row(id: f64, name: &str, status: Option<&str>) -> BTreeMap<String, CellValue> {
    let mut cells = BTreeMap::from([
        ("Id Profissional".to_string(), CellValue::Number(id)),
        ("Nome Profissional".to_string(), text(name)),
    ]);
    if let Some(status) = status {
        cells.insert("Status".to_string(), text(status));
    }
    cells
}

// ==============================================================================
// REGISTRATION AND REMOVAL
// ==============================================================================

#[test]
fn register_and_list_professionals() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);
    service.register(101, "Ana Souza", None).unwrap();
    service.register(202, "Bruno Lima", None).unwrap();

    let listed = service.list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, 101);
    assert_eq!(listed[1].name, "Bruno Lima");
}

#[test]
fn registering_twice_updates_in_place() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);
    service.register(101, "Ana Souza", None).unwrap();
    service.register(101, "Ana S. Oliveira", None).unwrap();

    assert_eq!(service.list().len(), 1);
    assert_eq!(service.get(101).unwrap().name, "Ana S. Oliveira");
}

#[test]
fn removal_without_slots_deletes_outright() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);
    service.register(101, "Ana Souza", None).unwrap();

    assert_eq!(service.remove(101).unwrap(), RemovalKind::Deleted);
    assert!(service.get(101).is_none());
}

#[test]
fn removal_with_slots_only_deactivates() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);
    service.register(101, "Ana Souza", None).unwrap();
    GridService::new(&store).regenerate(101).unwrap();

    assert_eq!(service.remove(101).unwrap(), RemovalKind::Deactivated);
    let professional = service.get(101).unwrap();
    assert!(!professional.active);
    // The grid is kept with its owner.
    assert_eq!(
        store.read(|tx| tx.count_slots_where(|s| s.professional_id == 101)),
        64
    );
}

// ==============================================================================
// REGISTRY IMPORT
// ==============================================================================

#[test]
fn registry_import_upserts_row_by_row() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);

    let outcome = service
        .import_registry(ingest_rows(vec![
            registry_row(101.0, "Ana Souza", Some("Ativo")),
            registry_row(202.0, "Bruno Lima", Some("Inativo")),
            registry_row(303.0, "Carla Dias", None),
        ]))
        .unwrap();

    assert_eq!(outcome.processed, 3);
    assert_eq!(outcome.skipped, 0);

    assert!(service.get(101).unwrap().active);
    assert!(!service.get(202).unwrap().active);
    assert!(service.get(303).unwrap().active);
}

#[test]
fn registry_rows_with_bad_ids_are_recorded_and_skipped() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);

    let mut bad = registry_row(101.0, "Ana Souza", None);
    bad.insert("Id Profissional".to_string(), text("abc"));

    let outcome = service
        .import_registry(ingest_rows(vec![
            bad,
            registry_row(202.0, "Bruno Lima", None),
        ]))
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped, 1);
    assert!(outcome.errors[0].contains("row 2"));
    assert_eq!(service.list().len(), 1);
}

#[test]
fn registry_rows_referencing_unknown_rooms_are_skipped() {
    let store = ScheduleStore::new();
    let service = ProfessionalService::new(&store);

    let mut with_room = registry_row(101.0, "Ana Souza", None);
    with_room.insert("Sala".to_string(), CellValue::Number(42.0));

    let outcome = service.import_registry(ingest_rows(vec![with_room])).unwrap();
    assert_eq!(outcome.processed, 0);
    assert_eq!(outcome.skipped, 1);
    assert!(outcome.errors[0].contains("room 42"));
}

#[test]
fn registry_rows_resolve_rooms_that_exist() {
    let store = ScheduleStore::new();
    let units = UnitService::new(&store);
    let unit = units.create_unit("Centro", false).unwrap();
    let room = units.create_room(unit.id, "Sala 1").unwrap();

    let mut with_room = registry_row(101.0, "Ana Souza", None);
    with_room.insert("Sala".to_string(), CellValue::Number(room.id as f64));

    ProfessionalService::new(&store)
        .import_registry(ingest_rows(vec![with_room]))
        .unwrap();

    assert_eq!(
        ProfessionalService::new(&store).get(101).unwrap().room_id,
        Some(room.id)
    );
}

#[test]
fn registry_import_requires_id_and_name_columns() {
    let store = ScheduleStore::new();
    let raw = vec![BTreeMap::from([(
        "Nome Profissional".to_string(),
        text("Ana Souza"),
    )])];

    let result = ProfessionalService::new(&store).import_registry(ingest_rows(raw));
    assert_matches!(result, Err(ImportError::MissingColumns(columns)) => {
        assert_eq!(columns, vec!["id profissional".to_string()]);
    });
}
