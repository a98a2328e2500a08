// libs/schedule-cell/src/services/fixed_schedule.rs
//
// The reconciliation core. A fixed-schedule import is authoritative and
// destructive: previous entries and every professional's slots are wiped,
// grids are rebuilt per professional, and each row then drives slot state.
// Row failures are recorded and never abort the batch; everything runs in
// one transaction so an unexpected failure rolls the whole import back.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::ScheduleStore;
use shared_database::StoreTx;
use shared_models::entities::{NewFixedScheduleEntry, Period, Professional, SlotStatus, Weekday};
use shared_utils::rows::SheetRow;

use crate::models::{
    FixedImportOutcome, FixedScheduleRow, ImportError, RowError, COL_PROFESSIONAL_ID,
    COL_PROFESSIONAL_NAME,
};
use crate::services::{grid, units};

type FirstUnitMap = BTreeMap<(i32, Weekday, Period), i32>;

pub struct FixedScheduleService {
    store: ScheduleStore,
}

impl FixedScheduleService {
    pub fn new(store: &ScheduleStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    pub fn import(&self, rows: Vec<SheetRow>) -> Result<FixedImportOutcome, ImportError> {
        let batch_id = Uuid::new_v4();
        info!(%batch_id, rows = rows.len(), "starting fixed-schedule import");

        // Fail-fast preconditions: the identifier column must exist and no
        // row may leave it empty. Both abort before any mutation.
        if !rows.iter().any(|row| row.has_column(COL_PROFESSIONAL_ID)) {
            return Err(ImportError::MissingColumns(vec![
                COL_PROFESSIONAL_ID.to_string()
            ]));
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.get(COL_PROFESSIONAL_ID).is_blank() {
                return Err(ImportError::NullProfessionalId(idx + 2));
            }
        }

        self.store.transaction(|tx| {
            let cleared_entries = tx.clear_schedule_entries();
            let cleared_slots = tx.delete_all_slots();
            info!(cleared_entries, cleared_slots, "cleared previous import");

            let incomplete = provision_grids(tx, &rows);

            let mut processed = 0;
            let mut skipped = 0;
            let mut errors: Vec<String> = Vec::new();
            let mut first_unit: FirstUnitMap = BTreeMap::new();

            for (idx, row) in rows.iter().enumerate() {
                // Spreadsheet numbering: data starts under the header row.
                let line = idx + 2;
                match reconcile_row(tx, row, &mut first_unit) {
                    Ok(diagnostics) => {
                        processed += 1;
                        errors.extend(
                            diagnostics
                                .into_iter()
                                .map(|diag| format!("row {line}: {diag}")),
                        );
                    }
                    Err(err) => {
                        skipped += 1;
                        errors.push(format!("row {line}: {err}"));
                    }
                }
            }

            propagate_units(tx, &first_unit);

            info!(%batch_id, processed, skipped, "fixed-schedule import finished");
            Ok(FixedImportOutcome {
                batch_id,
                processed,
                skipped,
                errors,
                incomplete_professionals: incomplete.into_iter().collect(),
            })
        })
    }
}

/// Create-or-fetch each distinct professional referenced by the import and
/// rebuild its grid. Grid generation is independent per professional: a
/// failure marks that id incomplete and the batch moves on.
fn provision_grids(tx: &mut StoreTx, rows: &[SheetRow]) -> BTreeSet<i32> {
    let mut seen: BTreeSet<i32> = BTreeSet::new();
    let mut incomplete: BTreeSet<i32> = BTreeSet::new();

    for row in rows {
        let Some(id) = row.get(COL_PROFESSIONAL_ID).as_int() else {
            // Unparseable ids surface as row errors during reconciliation.
            continue;
        };
        let id = id as i32;
        if !seen.insert(id) {
            continue;
        }

        match tx.professional(id) {
            Some(mut professional) => {
                // The import is authoritative: a referenced professional is
                // an active one.
                if !professional.active {
                    professional.active = true;
                    tx.upsert_professional(professional);
                }
            }
            None => {
                let name = row
                    .get(COL_PROFESSIONAL_NAME)
                    .as_text()
                    .unwrap_or_default();
                tx.upsert_professional(Professional {
                    id,
                    name,
                    room_id: None,
                    active: true,
                });
            }
        }

        if let Err(err) = grid::regenerate_grid(tx, id) {
            warn!(professional_id = id, %err, "grid generation failed");
            // Scrub whatever was written so no partial grid survives.
            tx.delete_slots_for_professional(id);
            incomplete.insert(id);
        }
    }
    incomplete
}

/// Reconcile one row: resolve its unit, append the schedule entry, record
/// the first-seen unit for the (professional, weekday, period) triple and,
/// when a patient is named, flip the matching slot to in-attendance.
/// Returns non-fatal diagnostics; an `Err` skips the row.
fn reconcile_row(
    tx: &mut StoreTx,
    row: &SheetRow,
    first_unit: &mut FirstUnitMap,
) -> Result<Vec<RowError>, RowError> {
    let parsed = FixedScheduleRow::parse(row)?;
    let unit = units::resolve_unit(tx, &parsed.unit_name)?;

    tx.append_schedule_entry(NewFixedScheduleEntry {
        date: parsed.date,
        weekday: parsed.weekday,
        hour: parsed.hour.clone(),
        unit_name: parsed.unit_name.clone(),
        room: parsed.room.clone(),
        professional_id: parsed.professional_id,
        professional_name: parsed.professional_name.clone(),
        attendance_type: parsed.attendance_type.clone(),
        billing_code: parsed.billing_code.clone(),
        session_count: parsed.session_count,
        payment_kind: parsed.payment_kind.clone(),
        patient: parsed.patient.clone(),
    });

    // First occurrence wins; later rows for the same triple do not move the
    // unit.
    first_unit
        .entry((parsed.professional_id, parsed.weekday, parsed.period))
        .or_insert(unit.id);

    let mut diagnostics = Vec::new();
    if parsed.patient.is_some() {
        let touched = tx.update_slots(
            |slot| {
                slot.professional_id == parsed.professional_id
                    && slot.weekday == parsed.weekday
                    && slot.hour_start == parsed.hour
            },
            |slot| {
                slot.status = SlotStatus::InAttendance;
                slot.unit_id = Some(unit.id);
            },
        );
        if touched == 0 {
            // The grid may be incomplete, or the day/hour pair may simply
            // not exist on it (a Saturday afternoon, say). Recorded, not
            // fatal: the entry itself was appended above.
            diagnostics.push(RowError::SlotNotFound {
                professional_id: parsed.professional_id,
                weekday: parsed.weekday,
                hour: parsed.hour.clone(),
            });
        }
    }

    Ok(diagnostics)
}

/// Spread each first-seen unit across every slot of its
/// (professional, weekday, period) triple, the still-Available ones
/// included.
fn propagate_units(tx: &mut StoreTx, first_unit: &FirstUnitMap) {
    for (&(professional_id, weekday, period), &unit_id) in first_unit {
        let touched = tx.update_slots(
            |slot| {
                slot.professional_id == professional_id
                    && slot.weekday == weekday
                    && slot.period == period
            },
            |slot| slot.unit_id = Some(unit_id),
        );
        debug!(
            professional_id,
            weekday = %weekday,
            period = %period,
            unit_id,
            touched,
            "unit propagated across period"
        );
    }
}
