// libs/schedule-cell/src/services/availability.rs

use shared_database::ScheduleStore;
use shared_models::entities::SlotStatus;

use crate::models::{AvailabilitySummary, SlotFilters, SlotView};

pub struct AvailabilityService {
    store: ScheduleStore,
}

impl AvailabilityService {
    pub fn new(store: &ScheduleStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// Filtered view over the grid, joined with professional and unit names.
    pub fn query(&self, filters: &SlotFilters) -> Vec<SlotView> {
        self.store.read(|tx| {
            let mut slots = tx.slots_where(|slot| filters.matches(slot));
            slots.sort_by(|a, b| {
                (a.professional_id, a.weekday, a.hour_start.as_str())
                    .cmp(&(b.professional_id, b.weekday, b.hour_start.as_str()))
            });

            slots
                .into_iter()
                .map(|slot| SlotView {
                    professional_id: slot.professional_id,
                    professional_name: tx
                        .professional(slot.professional_id)
                        .map(|p| p.name)
                        .unwrap_or_default(),
                    unit_name: slot.unit_id.and_then(|id| tx.unit(id)).map(|u| u.name),
                    weekday: slot.weekday,
                    period: slot.period,
                    hour_start: slot.hour_start,
                    hour_end: slot.hour_end,
                    status: slot.status,
                })
                .collect()
        })
    }

    pub fn summary(&self) -> AvailabilitySummary {
        self.store.read(|tx| AvailabilitySummary {
            active_professionals: tx.professionals_where(|p| p.active).len(),
            available: tx.count_slots_where(|s| s.status == SlotStatus::Available),
            in_attendance: tx.count_slots_where(|s| s.status == SlotStatus::InAttendance),
            blocked: tx.count_slots_where(|s| s.status == SlotStatus::Blocked),
        })
    }
}
