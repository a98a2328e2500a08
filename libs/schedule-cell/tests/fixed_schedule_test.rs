// libs/schedule-cell/tests/fixed_schedule_test.rs

use std::collections::BTreeMap;

use schedule_cell::models::ImportError;
use schedule_cell::services::fixed_schedule::FixedScheduleService;
use schedule_cell::services::grid::GridService;
use schedule_cell::services::professionals::ProfessionalService;
use shared_database::ScheduleStore;
use shared_models::entities::{Period, SlotStatus, Weekday};
use shared_utils::rows::{ingest_rows, CellValue, SheetRow};

use assert_matches::assert_matches;

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

// 2024-05-06 is a Monday, 2024-05-11 a Saturday.
const MONDAY: &str = "06/05/2024";
const SATURDAY: &str = "11/05/2024";

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

struct RowFixture {
    professional_id: i32,
    professional_name: &'static str,
    date: &'static str,
    hour: &'static str,
    unit: &'static str,
    patient: Option<&'static str>,
}

impl RowFixture {
    fn new(professional_id: i32, date: &'static str, hour: &'static str) -> Self {
        Self {
            professional_id,
            professional_name: "Ana Souza",
            date,
            hour,
            unit: "Centro",
            patient: None,
        }
    }

    fn unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    fn patient(mut self, patient: &'static str) -> Self {
        self.patient = Some(patient);
        self
    }

    fn build(self) -> BTreeMap<String, CellValue> {
        let mut cells = BTreeMap::from([
            (
                "Id Profissional".to_string(),
                CellValue::Number(self.professional_id as f64),
            ),
            (
                "Profissional".to_string(),
                text(self.professional_name),
            ),
            ("Data".to_string(), text(self.date)),
            ("Hora inicial".to_string(), text(self.hour)),
            ("Unidade".to_string(), text(self.unit)),
        ]);
        if let Some(patient) = self.patient {
            cells.insert("Paciente".to_string(), text(patient));
        }
        cells
    }
}

fn rows(specs: Vec<RowFixture>) -> Vec<SheetRow> {
    ingest_rows(specs.into_iter().map(RowFixture::build).collect())
}

// ==============================================================================
// HAPPY PATH RECONCILIATION
// ==============================================================================

#[test]
fn patient_row_marks_the_slot_in_attendance() {
    let store = ScheduleStore::new();
    let outcome = FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "08:00").patient("Ana")
        ]))
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped, 0);
    assert!(outcome.errors.is_empty());
    assert!(outcome.incomplete_professionals.is_empty());

    let slot = store
        .read(|tx| tx.find_slot(101, Weekday::Monday, "08:00"))
        .unwrap();
    assert_eq!(slot.status, SlotStatus::InAttendance);

    let unit = store
        .read(|tx| tx.units_where(|u| u.name == "Centro"))
        .pop()
        .unwrap();
    assert_eq!(slot.unit_id, Some(unit.id));

    // The professional was created on first reference, with a full grid.
    let professional = store.read(|tx| tx.professional(101)).unwrap();
    assert_eq!(professional.name, "Ana Souza");
    assert!(professional.active);
    assert_eq!(
        store.read(|tx| tx.count_slots_where(|s| s.professional_id == 101)),
        64
    );
}

#[test]
fn rows_without_a_patient_leave_the_slot_available() {
    let store = ScheduleStore::new();
    FixedScheduleService::new(&store)
        .import(rows(vec![RowFixture::new(101, MONDAY, "08:00")]))
        .unwrap();

    let slot = store
        .read(|tx| tx.find_slot(101, Weekday::Monday, "08:00"))
        .unwrap();
    assert_eq!(slot.status, SlotStatus::Available);
    // The unit still reaches the slot through back-propagation.
    assert!(slot.unit_id.is_some());

    // And the schedule entry was appended regardless.
    assert_eq!(store.read(|tx| tx.schedule_entries()).len(), 1);
}

#[test]
fn weekday_always_comes_from_the_date() {
    let store = ScheduleStore::new();
    let mut raw = RowFixture::new(101, MONDAY, "08:00").patient("Ana").build();
    // A lying free-text weekday column must be ignored.
    raw.insert("Dia da semana".to_string(), text("Sexta-feira"));

    FixedScheduleService::new(&store)
        .import(ingest_rows(vec![raw]))
        .unwrap();

    let entries = store.read(|tx| tx.schedule_entries());
    assert_eq!(entries[0].weekday, Weekday::Monday);
    assert!(store
        .read(|tx| tx.find_slot(101, Weekday::Monday, "08:00"))
        .map(|s| s.status == SlotStatus::InAttendance)
        .unwrap_or(false));
}

// ==============================================================================
// FIRST-SEEN UNIT ASSIGNMENT AND BACK-PROPAGATION
// ==============================================================================

#[test]
fn first_seen_unit_wins_for_a_period() {
    let store = ScheduleStore::new();
    FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "08:00").unit("Centro").patient("Ana"),
            RowFixture::new(101, MONDAY, "09:00").unit("Sul").patient("Bia"),
        ]))
        .unwrap();

    let centro = store
        .read(|tx| tx.units_where(|u| u.name == "Centro"))
        .pop()
        .unwrap();

    // Every Monday-morning slot, including the 09:00 one that named another
    // unit, carries the first row's unit after back-propagation.
    let morning = store.read(|tx| {
        tx.slots_where(|s| {
            s.professional_id == 101
                && s.weekday == Weekday::Monday
                && s.period == Period::Matutino
        })
    });
    assert_eq!(morning.len(), 6);
    assert!(morning.iter().all(|s| s.unit_id == Some(centro.id)));
}

#[test]
fn periods_keep_their_own_first_seen_unit() {
    let store = ScheduleStore::new();
    FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "08:00").unit("Centro"),
            RowFixture::new(101, MONDAY, "14:00").unit("Sul"),
        ]))
        .unwrap();

    let (centro, sul) = store.read(|tx| {
        (
            tx.units_where(|u| u.name == "Centro").pop().unwrap(),
            tx.units_where(|u| u.name == "Sul").pop().unwrap(),
        )
    });

    let slots = store.read(|tx| tx.slots_where(|s| s.weekday == Weekday::Monday));
    for slot in slots {
        match slot.period {
            Period::Matutino => assert_eq!(slot.unit_id, Some(centro.id)),
            Period::Vespertino => assert_eq!(slot.unit_id, Some(sul.id)),
        }
    }
}

// ==============================================================================
// ROW-LOCAL FAILURES
// ==============================================================================

#[test]
fn out_of_range_hour_is_rejected_before_anything_is_appended() {
    let store = ScheduleStore::new();
    let outcome = FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "19:00").patient("Ana"),
            RowFixture::new(101, MONDAY, "06:30").patient("Bia"),
        ]))
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.errors[0].contains("serviced window"));

    // Rejected rows leave no trace: no entries, no slot mutations.
    assert!(store.read(|tx| tx.schedule_entries()).is_empty());
    let slots = store.read(|tx| tx.slots_where(|s| s.professional_id == 101));
    assert_eq!(slots.len(), 64);
    assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
}

#[test]
fn missing_grid_slot_is_a_diagnostic_not_a_skip() {
    let store = ScheduleStore::new();
    // Saturday afternoon is in the serviced window but not on the grid.
    let outcome = FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, SATURDAY, "14:00").patient("Ana")
        ]))
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("no slot"));

    // The entry was still appended; the data is kept for remediation.
    assert_eq!(store.read(|tx| tx.schedule_entries()).len(), 1);
}

#[test]
fn unparseable_dates_skip_the_row_only() {
    let store = ScheduleStore::new();
    let outcome = FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, "not a date", "08:00"),
            RowFixture::new(101, MONDAY, "09:00"),
        ]))
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(store.read(|tx| tx.schedule_entries()).len(), 1);
}

// ==============================================================================
// UNIT NAME HANDLING
// ==============================================================================

#[test]
fn noisy_unit_spellings_collapse_to_the_canonical_name() {
    let store = ScheduleStore::new();
    FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "08:00").unit("Republica do Libano"),
            RowFixture::new(101, MONDAY, "09:00").unit("República do Líbano "),
        ]))
        .unwrap();

    let units = store.read(|tx| tx.units_where(|_| true));
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].name, "República do Líbano");

    let entries = store.read(|tx| tx.schedule_entries());
    assert!(entries
        .iter()
        .all(|e| e.unit_name == "República do Líbano"));
}

#[test]
fn unit_lookup_tolerates_case_and_accent_variation() {
    let store = ScheduleStore::new();
    FixedScheduleService::new(&store)
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "08:00").unit("São João"),
            RowFixture::new(101, MONDAY, "09:00").unit("sao joao"),
        ]))
        .unwrap();

    // The second spelling resolved to the unit the first one created.
    assert_eq!(store.read(|tx| tx.units_where(|_| true)).len(), 1);
}

// ==============================================================================
// FATAL PRECONDITIONS AND BATCH REPLACEMENT
// ==============================================================================

#[test]
fn missing_identifier_column_aborts_the_import() {
    let store = ScheduleStore::new();
    let raw = vec![BTreeMap::from([
        ("Data".to_string(), text(MONDAY)),
        ("Hora inicial".to_string(), text("08:00")),
        ("Unidade".to_string(), text("Centro")),
    ])];

    let result = FixedScheduleService::new(&store).import(ingest_rows(raw));
    assert_matches!(result, Err(ImportError::MissingColumns(_)));
    // Nothing was touched.
    assert!(store.read(|tx| tx.professionals_where(|_| true)).is_empty());
}

#[test]
fn null_identifier_aborts_the_import() {
    let store = ScheduleStore::new();
    let mut second = RowFixture::new(101, MONDAY, "09:00").build();
    second.insert("Id Profissional".to_string(), CellValue::Empty);

    let raw = vec![RowFixture::new(101, MONDAY, "08:00").build(), second];
    let result = FixedScheduleService::new(&store).import(ingest_rows(raw));

    assert_matches!(result, Err(ImportError::NullProfessionalId(3)));
    assert!(store.read(|tx| tx.professionals_where(|_| true)).is_empty());
    assert!(store.read(|tx| tx.schedule_entries()).is_empty());
}

#[test]
fn a_second_import_fully_replaces_the_first() {
    let store = ScheduleStore::new();
    let service = FixedScheduleService::new(&store);

    service
        .import(rows(vec![
            RowFixture::new(101, MONDAY, "08:00").patient("Ana")
        ]))
        .unwrap();
    service
        .import(rows(vec![RowFixture::new(202, MONDAY, "10:00").patient("Bia")]))
        .unwrap();

    // Entries are batch-replaced.
    let entries = store.read(|tx| tx.schedule_entries());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].professional_id, 202);

    // Professional 101 was not in the new file: its grid is gone.
    assert_eq!(
        store.read(|tx| tx.count_slots_where(|s| s.professional_id == 101)),
        0
    );
    assert_eq!(
        store.read(|tx| tx.count_slots_where(|s| s.professional_id == 202)),
        64
    );
}

#[test]
fn import_reactivates_a_soft_deleted_professional() {
    let store = ScheduleStore::new();
    ProfessionalService::new(&store)
        .register(101, "Ana Souza", None)
        .unwrap();
    GridService::new(&store).regenerate(101).unwrap();
    // Owns slots, so removal only deactivates.
    ProfessionalService::new(&store).remove(101).unwrap();
    assert!(!store.read(|tx| tx.professional(101)).unwrap().active);

    FixedScheduleService::new(&store)
        .import(rows(vec![RowFixture::new(101, MONDAY, "08:00")]))
        .unwrap();

    assert!(store.read(|tx| tx.professional(101)).unwrap().active);
}
