// libs/schedule-cell/src/services/blockages.rs
//
// Blockage imports mark grid slots unusable. Rows that fail normalization
// are listed back to the operator, who must explicitly confirm before the
// valid remainder is applied.

use std::collections::BTreeSet;

use tracing::info;
use uuid::Uuid;

use shared_database::ScheduleStore;
use shared_models::entities::SlotStatus;
use shared_utils::rows::SheetRow;

use crate::models::{
    BlockageOutcome, BlockageRow, ImportError, RowError, COL_BLOCK_HOUR, COL_BLOCK_WEEKDAY,
    COL_PROFESSIONAL_ID,
};

pub struct BlockageService {
    store: ScheduleStore,
}

impl BlockageService {
    pub fn new(store: &ScheduleStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    pub fn apply(
        &self,
        rows: Vec<SheetRow>,
        confirm_invalid: bool,
    ) -> Result<BlockageOutcome, ImportError> {
        let batch_id = Uuid::new_v4();
        info!(%batch_id, rows = rows.len(), "starting blockage import");

        let missing: Vec<String> = [COL_BLOCK_WEEKDAY, COL_BLOCK_HOUR, COL_PROFESSIONAL_ID]
            .into_iter()
            .filter(|column| !rows.iter().any(|row| row.has_column(column)))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        // Normalize everything up front so the operator sees the full list
        // of invalid rows before anything is applied.
        let parsed: Vec<(usize, Result<BlockageRow, RowError>)> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx + 2, BlockageRow::parse(row)))
            .collect();

        let invalid: Vec<String> = parsed
            .iter()
            .filter_map(|(line, result)| {
                result
                    .as_ref()
                    .err()
                    .map(|err| format!("row {line}: {err}"))
            })
            .collect();
        if !invalid.is_empty() && !confirm_invalid {
            return Err(ImportError::ConfirmationRequired(invalid));
        }

        self.store.transaction(|tx| {
            let mut processed = 0;
            let mut skipped = 0;
            let mut errors: Vec<String> = Vec::new();
            let mut affected: BTreeSet<String> = BTreeSet::new();

            for (line, result) in parsed {
                let row = match result {
                    Ok(row) => row,
                    Err(err) => {
                        skipped += 1;
                        errors.push(format!("row {line}: {err}"));
                        continue;
                    }
                };

                let Some(professional) = tx.professional(row.professional_id) else {
                    skipped += 1;
                    errors.push(format!(
                        "row {line}: {}",
                        RowError::ProfessionalNotFound(row.professional_id)
                    ));
                    continue;
                };

                let touched = tx.update_slots(
                    |slot| {
                        slot.professional_id == row.professional_id
                            && slot.weekday == row.weekday
                            && slot.hour_start == row.hour
                    },
                    |slot| slot.status = SlotStatus::Blocked,
                );

                if touched == 0 {
                    skipped += 1;
                    errors.push(format!(
                        "row {line}: {}",
                        RowError::SlotNotFound {
                            professional_id: row.professional_id,
                            weekday: row.weekday,
                            hour: row.hour.clone(),
                        }
                    ));
                } else {
                    processed += 1;
                    affected.insert(professional.name.clone());
                    info!(
                        professional = %professional.name,
                        weekday = %row.weekday,
                        hour = %row.hour,
                        "slot blocked"
                    );
                }
            }

            info!(%batch_id, processed, skipped, "blockage import finished");
            Ok(BlockageOutcome {
                batch_id,
                processed,
                skipped,
                errors,
                professionals_affected: affected.into_iter().collect(),
            })
        })
    }
}
