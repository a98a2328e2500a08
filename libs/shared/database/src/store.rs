// libs/shared/database/src/store.rs
//
// Embedded relational store for the scheduling entities. All access goes
// through [`ScheduleStore::transaction`] or [`ScheduleStore::read`]: a
// transaction runs against a working copy of the state and only replaces the
// shared state when the closure returns Ok, so an error anywhere inside rolls
// the whole batch back. Row-level failures an import chooses to tolerate are
// handled inside the closure and simply stay part of the working copy.
//
// Single writer by design; concurrent imports against the same professional
// are unsupported.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::debug;

use shared_models::entities::{
    AvailabilitySlot, FixedScheduleEntry, NewAvailabilitySlot, NewFixedScheduleEntry, NewRoomSlot,
    Professional, Room, RoomSlot, Unit, Weekday,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("professional {0} not found")]
    ProfessionalNotFound(i32),

    #[error("unit {0} not found")]
    UnitNotFound(i32),

    #[error("room {0} not found")]
    RoomNotFound(i32),

    #[error("unit '{0}' already exists")]
    DuplicateUnitName(String),

    #[error("duplicate slot for professional {professional_id} on {weekday} at {hour}")]
    DuplicateSlot {
        professional_id: i32,
        weekday: Weekday,
        hour: String,
    },

    #[error("duplicate slot for room {room_id} on {weekday} at {hour}")]
    DuplicateRoomSlot {
        room_id: i32,
        weekday: Weekday,
        hour: String,
    },
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    professionals: BTreeMap<i32, Professional>,
    units: BTreeMap<i32, Unit>,
    rooms: BTreeMap<i32, Room>,
    slots: BTreeMap<i64, AvailabilitySlot>,
    room_slots: BTreeMap<i64, RoomSlot>,
    schedule_entries: BTreeMap<i64, FixedScheduleEntry>,
    last_unit_id: i32,
    last_room_id: i32,
    last_slot_id: i64,
    last_room_slot_id: i64,
    last_entry_id: i64,
}

#[derive(Clone, Default)]
pub struct ScheduleStore {
    state: Arc<RwLock<StoreState>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, StoreState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, StoreState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run `f` against a working copy of the store. `Ok` commits the copy,
    /// any `Err` discards it wholesale.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&mut StoreTx) -> Result<T, E>) -> Result<T, E> {
        let mut guard = self.write_guard();
        let mut tx = StoreTx {
            state: guard.clone(),
        };
        match f(&mut tx) {
            Ok(value) => {
                *guard = tx.state;
                Ok(value)
            }
            Err(err) => {
                debug!("transaction rolled back");
                Err(err)
            }
        }
    }

    /// Read-only access through the same accessor surface.
    pub fn read<T>(&self, f: impl FnOnce(&StoreTx) -> T) -> T {
        let guard = self.read_guard();
        let tx = StoreTx {
            state: guard.clone(),
        };
        f(&tx)
    }
}

/// Scoped transaction handle: every import operation receives one of these
/// instead of touching shared state directly.
pub struct StoreTx {
    state: StoreState,
}

impl StoreTx {
    // --------------------------------------------------------------------------
    // Professionals
    // --------------------------------------------------------------------------

    pub fn professional(&self, id: i32) -> Option<Professional> {
        self.state.professionals.get(&id).cloned()
    }

    pub fn professionals_where(&self, pred: impl Fn(&Professional) -> bool) -> Vec<Professional> {
        self.state
            .professionals
            .values()
            .filter(|p| pred(p))
            .cloned()
            .collect()
    }

    pub fn upsert_professional(&mut self, professional: Professional) {
        self.state
            .professionals
            .insert(professional.id, professional);
    }

    pub fn set_professional_active(&mut self, id: i32, active: bool) -> Result<(), StoreError> {
        let professional = self
            .state
            .professionals
            .get_mut(&id)
            .ok_or(StoreError::ProfessionalNotFound(id))?;
        professional.active = active;
        Ok(())
    }

    /// Hard delete; the professional's slots go with it.
    pub fn delete_professional(&mut self, id: i32) -> Result<(), StoreError> {
        self.state
            .professionals
            .remove(&id)
            .ok_or(StoreError::ProfessionalNotFound(id))?;
        self.state.slots.retain(|_, slot| slot.professional_id != id);
        Ok(())
    }

    // --------------------------------------------------------------------------
    // Units and rooms
    // --------------------------------------------------------------------------

    pub fn unit(&self, id: i32) -> Option<Unit> {
        self.state.units.get(&id).cloned()
    }

    pub fn units_where(&self, pred: impl Fn(&Unit) -> bool) -> Vec<Unit> {
        self.state.units.values().filter(|u| pred(u)).cloned().collect()
    }

    pub fn insert_unit(&mut self, name: &str, serves_saturday: bool) -> Result<Unit, StoreError> {
        if self.state.units.values().any(|u| u.name == name) {
            return Err(StoreError::DuplicateUnitName(name.to_string()));
        }
        self.state.last_unit_id += 1;
        let unit = Unit {
            id: self.state.last_unit_id,
            name: name.to_string(),
            serves_saturday,
            active: true,
        };
        self.state.units.insert(unit.id, unit.clone());
        Ok(unit)
    }

    pub fn room(&self, id: i32) -> Option<Room> {
        self.state.rooms.get(&id).cloned()
    }

    pub fn rooms_where(&self, pred: impl Fn(&Room) -> bool) -> Vec<Room> {
        self.state.rooms.values().filter(|r| pred(r)).cloned().collect()
    }

    pub fn insert_room(&mut self, unit_id: i32, name: &str) -> Result<Room, StoreError> {
        if !self.state.units.contains_key(&unit_id) {
            return Err(StoreError::UnitNotFound(unit_id));
        }
        self.state.last_room_id += 1;
        let room = Room {
            id: self.state.last_room_id,
            unit_id,
            name: name.to_string(),
            active: true,
        };
        self.state.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    // --------------------------------------------------------------------------
    // Availability slots
    // --------------------------------------------------------------------------

    pub fn slots_where(&self, pred: impl Fn(&AvailabilitySlot) -> bool) -> Vec<AvailabilitySlot> {
        self.state.slots.values().filter(|s| pred(s)).cloned().collect()
    }

    pub fn count_slots_where(&self, pred: impl Fn(&AvailabilitySlot) -> bool) -> usize {
        self.state.slots.values().filter(|s| pred(s)).count()
    }

    /// The value-based join key: at most one slot per
    /// (professional, weekday, hour_start).
    pub fn find_slot(
        &self,
        professional_id: i32,
        weekday: Weekday,
        hour_start: &str,
    ) -> Option<AvailabilitySlot> {
        self.state
            .slots
            .values()
            .find(|s| {
                s.professional_id == professional_id
                    && s.weekday == weekday
                    && s.hour_start == hour_start
            })
            .cloned()
    }

    /// Apply `mutate` to every slot matching `pred`; returns how many matched.
    pub fn update_slots(
        &mut self,
        pred: impl Fn(&AvailabilitySlot) -> bool,
        mut mutate: impl FnMut(&mut AvailabilitySlot),
    ) -> usize {
        let mut touched = 0;
        for slot in self.state.slots.values_mut() {
            if pred(slot) {
                mutate(slot);
                touched += 1;
            }
        }
        touched
    }

    pub fn delete_slots_for_professional(&mut self, professional_id: i32) -> usize {
        let before = self.state.slots.len();
        self.state
            .slots
            .retain(|_, slot| slot.professional_id != professional_id);
        before - self.state.slots.len()
    }

    pub fn delete_all_slots(&mut self) -> usize {
        let count = self.state.slots.len();
        self.state.slots.clear();
        count
    }

    /// Atomically replace a professional's whole grid: prior slots are
    /// removed and the new ones inserted with the uniqueness check applied
    /// across the batch. Errors leave nothing half-written because the
    /// enclosing transaction discards the working copy.
    pub fn replace_professional_slots(
        &mut self,
        professional_id: i32,
        slots: Vec<NewAvailabilitySlot>,
    ) -> Result<usize, StoreError> {
        if !self.state.professionals.contains_key(&professional_id) {
            return Err(StoreError::ProfessionalNotFound(professional_id));
        }
        self.delete_slots_for_professional(professional_id);

        let mut seen: Vec<(Weekday, String)> = Vec::with_capacity(slots.len());
        let count = slots.len();
        for new_slot in slots {
            let key = (new_slot.weekday, new_slot.hour_start.clone());
            if seen.contains(&key) {
                return Err(StoreError::DuplicateSlot {
                    professional_id,
                    weekday: new_slot.weekday,
                    hour: new_slot.hour_start,
                });
            }
            seen.push(key);

            self.state.last_slot_id += 1;
            let slot = AvailabilitySlot {
                id: self.state.last_slot_id,
                professional_id: new_slot.professional_id,
                unit_id: new_slot.unit_id,
                weekday: new_slot.weekday,
                period: new_slot.period,
                hour_start: new_slot.hour_start,
                hour_end: new_slot.hour_end,
                status: new_slot.status,
            };
            self.state.slots.insert(slot.id, slot);
        }
        Ok(count)
    }

    // --------------------------------------------------------------------------
    // Room slots
    // --------------------------------------------------------------------------

    pub fn room_slots_where(&self, pred: impl Fn(&RoomSlot) -> bool) -> Vec<RoomSlot> {
        self.state
            .room_slots
            .values()
            .filter(|s| pred(s))
            .cloned()
            .collect()
    }

    pub fn replace_room_slots(
        &mut self,
        room_id: i32,
        slots: Vec<NewRoomSlot>,
    ) -> Result<usize, StoreError> {
        if !self.state.rooms.contains_key(&room_id) {
            return Err(StoreError::RoomNotFound(room_id));
        }
        self.state.room_slots.retain(|_, slot| slot.room_id != room_id);

        let mut seen: Vec<(Weekday, String)> = Vec::with_capacity(slots.len());
        let count = slots.len();
        for new_slot in slots {
            let key = (new_slot.weekday, new_slot.hour.clone());
            if seen.contains(&key) {
                return Err(StoreError::DuplicateRoomSlot {
                    room_id,
                    weekday: new_slot.weekday,
                    hour: new_slot.hour,
                });
            }
            seen.push(key);

            self.state.last_room_slot_id += 1;
            let slot = RoomSlot {
                id: self.state.last_room_slot_id,
                room_id: new_slot.room_id,
                weekday: new_slot.weekday,
                hour: new_slot.hour,
                status: new_slot.status,
            };
            self.state.room_slots.insert(slot.id, slot);
        }
        Ok(count)
    }

    // --------------------------------------------------------------------------
    // Fixed schedule entries
    // --------------------------------------------------------------------------

    pub fn schedule_entries(&self) -> Vec<FixedScheduleEntry> {
        self.state.schedule_entries.values().cloned().collect()
    }

    pub fn schedule_entries_where(
        &self,
        pred: impl Fn(&FixedScheduleEntry) -> bool,
    ) -> Vec<FixedScheduleEntry> {
        self.state
            .schedule_entries
            .values()
            .filter(|e| pred(e))
            .cloned()
            .collect()
    }

    pub fn clear_schedule_entries(&mut self) -> usize {
        let count = self.state.schedule_entries.len();
        self.state.schedule_entries.clear();
        count
    }

    pub fn append_schedule_entry(&mut self, entry: NewFixedScheduleEntry) -> FixedScheduleEntry {
        self.state.last_entry_id += 1;
        let entry = FixedScheduleEntry {
            id: self.state.last_entry_id,
            date: entry.date,
            weekday: entry.weekday,
            hour: entry.hour,
            unit_name: entry.unit_name,
            room: entry.room,
            professional_id: entry.professional_id,
            professional_name: entry.professional_name,
            attendance_type: entry.attendance_type,
            billing_code: entry.billing_code,
            session_count: entry.session_count,
            payment_kind: entry.payment_kind,
            patient: entry.patient,
        };
        self.state
            .schedule_entries
            .insert(entry.id, entry.clone());
        entry
    }
}
