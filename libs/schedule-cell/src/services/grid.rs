// libs/schedule-cell/src/services/grid.rs
//
// Canonical weekly grids. A professional's week is 5 full weekdays
// (6 morning + 6 afternoon hourly slots) plus a short Saturday morning
// (4 slots), 64 slots in total. Rooms run 07:00-18:00 on weekdays and,
// when their unit serves Saturdays, the morning hours before noon.

use thiserror::Error;
use tracing::debug;

use shared_database::{ScheduleStore, StoreError, StoreTx};
use shared_models::entities::{NewAvailabilitySlot, NewRoomSlot, Period, SlotStatus, Weekday};

const MORNING_HOURS: std::ops::Range<u32> = 7..13;
const AFTERNOON_HOURS: std::ops::Range<u32> = 13..19;
const SATURDAY_HOURS: std::ops::Range<u32> = 8..12;
const ROOM_HOURS: std::ops::Range<u32> = 7..19;
const ROOM_SATURDAY_HOURS: std::ops::Range<u32> = 7..12;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("professional {0} not found")]
    ProfessionalNotFound(i32),

    #[error("professional {0} is inactive")]
    ProfessionalInactive(i32),

    #[error("room {0} not found")]
    RoomNotFound(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// The full 64-slot weekly grid for one professional, all Available.
pub fn build_professional_grid(professional_id: i32) -> Vec<NewAvailabilitySlot> {
    let slot = |weekday, period, hour| NewAvailabilitySlot {
        professional_id,
        unit_id: None,
        weekday,
        period,
        hour_start: hour_label(hour),
        hour_end: None,
        status: SlotStatus::Available,
    };

    let mut slots = Vec::with_capacity(64);
    for weekday in Weekday::WORK_DAYS {
        for hour in MORNING_HOURS {
            slots.push(slot(weekday, Period::Matutino, hour));
        }
        for hour in AFTERNOON_HOURS {
            slots.push(slot(weekday, Period::Vespertino, hour));
        }
    }
    for hour in SATURDAY_HOURS {
        slots.push(slot(Weekday::Saturday, Period::Matutino, hour));
    }
    slots
}

/// A room's weekly grid. Saturday mornings only appear when the owning
/// unit serves Saturdays.
pub fn build_room_grid(room_id: i32, serves_saturday: bool) -> Vec<NewRoomSlot> {
    let slot = |weekday, hour| NewRoomSlot {
        room_id,
        weekday,
        hour: hour_label(hour),
        status: SlotStatus::Available,
    };

    let mut slots = Vec::new();
    for weekday in Weekday::WORK_DAYS {
        for hour in ROOM_HOURS {
            slots.push(slot(weekday, hour));
        }
    }
    if serves_saturday {
        for hour in ROOM_SATURDAY_HOURS {
            slots.push(slot(Weekday::Saturday, hour));
        }
    }
    slots
}

/// Regenerate a professional's grid inside an existing transaction. Prior
/// slots are fully replaced; nothing partial survives a failure.
pub fn regenerate_grid(tx: &mut StoreTx, professional_id: i32) -> Result<usize, GridError> {
    let professional = tx
        .professional(professional_id)
        .ok_or(GridError::ProfessionalNotFound(professional_id))?;
    if !professional.active {
        return Err(GridError::ProfessionalInactive(professional_id));
    }

    let count = tx.replace_professional_slots(professional_id, build_professional_grid(professional_id))?;
    debug!(professional_id, slots = count, "grid regenerated");
    Ok(count)
}

/// Regenerate a room's grid inside an existing transaction.
pub fn regenerate_room_grid(tx: &mut StoreTx, room_id: i32) -> Result<usize, GridError> {
    let room = tx.room(room_id).ok_or(GridError::RoomNotFound(room_id))?;
    let serves_saturday = tx
        .unit(room.unit_id)
        .map(|unit| unit.serves_saturday)
        .unwrap_or(false);

    let count = tx.replace_room_slots(room_id, build_room_grid(room_id, serves_saturday))?;
    debug!(room_id, slots = count, "room grid regenerated");
    Ok(count)
}

pub struct GridService {
    store: ScheduleStore,
}

impl GridService {
    pub fn new(store: &ScheduleStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// Regenerate the weekly grid for an active professional, atomically.
    pub fn regenerate(&self, professional_id: i32) -> Result<usize, GridError> {
        self.store
            .transaction(|tx| regenerate_grid(tx, professional_id))
    }

    pub fn regenerate_room(&self, room_id: i32) -> Result<usize, GridError> {
        self.store
            .transaction(|tx| regenerate_room_grid(tx, room_id))
    }
}
