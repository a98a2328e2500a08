// libs/schedule-cell/src/services/professionals.rs

use tracing::info;
use uuid::Uuid;

use shared_database::{ScheduleStore, StoreError};
use shared_models::entities::Professional;
use shared_utils::rows::SheetRow;

use crate::models::{
    ImportError, RegistryOutcome, RegistryRow, RemovalKind, RowError, COL_PROFESSIONAL_ID,
    COL_REGISTRY_NAME,
};

pub struct ProfessionalService {
    store: ScheduleStore,
}

impl ProfessionalService {
    pub fn new(store: &ScheduleStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// Create or update a single professional. The id comes from the
    /// clinic's management system and is taken as-is.
    pub fn register(
        &self,
        id: i32,
        name: &str,
        room_id: Option<i32>,
    ) -> Result<Professional, StoreError> {
        self.store.transaction(|tx| {
            if let Some(room) = room_id {
                if tx.room(room).is_none() {
                    return Err(StoreError::RoomNotFound(room));
                }
            }
            let professional = Professional {
                id,
                name: name.trim().to_string(),
                room_id,
                active: true,
            };
            tx.upsert_professional(professional.clone());
            Ok(professional)
        })
    }

    pub fn list(&self) -> Vec<Professional> {
        let mut professionals = self.store.read(|tx| tx.professionals_where(|_| true));
        professionals.sort_by_key(|p| p.id);
        professionals
    }

    pub fn get(&self, id: i32) -> Option<Professional> {
        self.store.read(|tx| tx.professional(id))
    }

    /// Remove a professional. Once a professional owns slots it is only
    /// deactivated, never deleted, so historical grids keep their owner.
    pub fn remove(&self, id: i32) -> Result<RemovalKind, StoreError> {
        self.store.transaction(|tx| {
            if tx.professional(id).is_none() {
                return Err(StoreError::ProfessionalNotFound(id));
            }
            let owns_slots = tx.count_slots_where(|slot| slot.professional_id == id) > 0;
            if owns_slots {
                tx.set_professional_active(id, false)?;
                info!(professional_id = id, "professional deactivated");
                Ok(RemovalKind::Deactivated)
            } else {
                tx.delete_professional(id)?;
                info!(professional_id = id, "professional deleted");
                Ok(RemovalKind::Deleted)
            }
        })
    }

    /// Registry import: upsert professionals row by row. Unlike the
    /// fixed-schedule import this one is incremental; bad rows are recorded
    /// and the rest still land.
    pub fn import_registry(&self, rows: Vec<SheetRow>) -> Result<RegistryOutcome, ImportError> {
        let batch_id = Uuid::new_v4();
        info!(%batch_id, rows = rows.len(), "starting professional registry import");

        let missing: Vec<String> = [COL_PROFESSIONAL_ID, COL_REGISTRY_NAME]
            .into_iter()
            .filter(|column| !rows.iter().any(|row| row.has_column(column)))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        self.store.transaction(|tx| {
            let mut processed = 0;
            let mut skipped = 0;
            let mut errors: Vec<String> = Vec::new();

            for (idx, row) in rows.iter().enumerate() {
                let line = idx + 2;
                let parsed = match RegistryRow::parse(row) {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        skipped += 1;
                        errors.push(format!("row {line}: {err}"));
                        continue;
                    }
                };

                if let Some(room) = parsed.room_id {
                    if tx.room(room).is_none() {
                        skipped += 1;
                        errors.push(format!("row {line}: {}", RowError::RoomNotFound(room)));
                        continue;
                    }
                }

                tx.upsert_professional(Professional {
                    id: parsed.id,
                    name: parsed.name,
                    room_id: parsed.room_id,
                    active: parsed.active,
                });
                processed += 1;
            }

            info!(%batch_id, processed, skipped, "registry import finished");
            Ok(RegistryOutcome {
                batch_id,
                processed,
                skipped,
                errors,
            })
        })
    }
}
