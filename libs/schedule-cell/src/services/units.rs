// libs/schedule-cell/src/services/units.rs

use tracing::info;

use shared_database::{ScheduleStore, StoreError, StoreTx};
use shared_models::entities::{Room, Unit};
use shared_utils::normalize::normalize_text;

use crate::models::RowError;

/// Noisy spellings that must collapse to one canonical unit name. A raw
/// name whose normalized form contains every fragment of an entry maps to
/// that entry's canonical spelling.
const UNIT_ALIASES: &[(&str, &[&str])] = &[("República do Líbano", &["republica", "libano"])];

/// Trim a raw unit name and fold known alias spellings into the canonical
/// accented form. Unrecognized names pass through with their original
/// accents intact.
pub fn canonical_unit_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let normalized = normalize_text(trimmed);
    for (canonical, fragments) in UNIT_ALIASES {
        if fragments.iter().all(|fragment| normalized.contains(fragment)) {
            return (*canonical).to_string();
        }
    }
    trimmed.to_string()
}

/// Find or create a unit by name: exact match first, then a
/// case/diacritic-insensitive substring match, then lazy creation keeping
/// the original spelling. Never returns "no unit"; a creation failure fails
/// the row, not the batch.
pub fn resolve_unit(tx: &mut StoreTx, raw_name: &str) -> Result<Unit, RowError> {
    let name = canonical_unit_name(raw_name);
    if name.is_empty() {
        return Err(RowError::EmptyUnitName);
    }

    if let Some(unit) = tx.units_where(|u| u.name == name).into_iter().next() {
        return Ok(unit);
    }

    let needle = normalize_text(&name);
    if let Some(unit) = tx
        .units_where(|u| normalize_text(&u.name).contains(&needle))
        .into_iter()
        .next()
    {
        return Ok(unit);
    }

    let unit = tx
        .insert_unit(&name, false)
        .map_err(|err| RowError::UnitResolution(err.to_string()))?;
    info!(unit_id = unit.id, name = %unit.name, "created unit");
    Ok(unit)
}

pub struct UnitService {
    store: ScheduleStore,
}

impl UnitService {
    pub fn new(store: &ScheduleStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    pub fn create_unit(&self, name: &str, serves_saturday: bool) -> Result<Unit, StoreError> {
        let name = canonical_unit_name(name);
        self.store
            .transaction(|tx| tx.insert_unit(&name, serves_saturday))
    }

    pub fn list_units(&self) -> Vec<Unit> {
        let mut units = self.store.read(|tx| tx.units_where(|_| true));
        units.sort_by_key(|u| u.id);
        units
    }

    pub fn create_room(&self, unit_id: i32, name: &str) -> Result<Room, StoreError> {
        self.store.transaction(|tx| tx.insert_room(unit_id, name))
    }
}
