// libs/shared/models/src/entities.rs
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CALENDAR VOCABULARY
// ==============================================================================

/// Day of the week as it appears on the availability grid.
///
/// The grid itself only uses Monday through Saturday; Sunday exists so that
/// dates falling on a Sunday still resolve to a day instead of an error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Monday through Friday, the full-grid days.
    pub const WORK_DAYS: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Resolve the weekday from a calendar date. This is the authoritative
    /// source for imported rows; free-text weekday columns are never trusted
    /// when a date is present.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    /// Simplified Portuguese name, the form used on the grid ("Segunda").
    pub fn short_pt(&self) -> &'static str {
        match self {
            Weekday::Monday => "Segunda",
            Weekday::Tuesday => "Terça",
            Weekday::Wednesday => "Quarta",
            Weekday::Thursday => "Quinta",
            Weekday::Friday => "Sexta",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }

    /// Long Portuguese name as written on spreadsheets ("Segunda-feira").
    pub fn long_pt(&self) -> &'static str {
        match self {
            Weekday::Monday => "Segunda-feira",
            Weekday::Tuesday => "Terça-feira",
            Weekday::Wednesday => "Quarta-feira",
            Weekday::Thursday => "Quinta-feira",
            Weekday::Friday => "Sexta-feira",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_pt())
    }
}

/// Half-day period of a slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Matutino,
    Vespertino,
}

impl Period {
    /// Periods split at 13:00: anything earlier is Matutino.
    pub fn from_hour(hour: u32) -> Self {
        if hour < 13 {
            Period::Matutino
        } else {
            Period::Vespertino
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Matutino => write!(f, "Matutino"),
            Period::Vespertino => write!(f, "Vespertino"),
        }
    }
}

// ==============================================================================
// SLOT STATE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    InAttendance,
    Blocked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::InAttendance => write!(f, "in_attendance"),
            SlotStatus::Blocked => write!(f, "blocked"),
        }
    }
}

// ==============================================================================
// CORE ENTITIES
// ==============================================================================

/// A therapist. The id is externally assigned (it comes from the clinic's
/// management system) and is never generated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: i32,
    pub name: String,
    pub room_id: Option<i32>,
    pub active: bool,
}

/// A physical clinic location. The name is unique and keeps its accents;
/// matching against noisy spellings happens through normalized lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i32,
    pub name: String,
    pub serves_saturday: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i32,
    pub unit_id: i32,
    pub name: String,
    pub active: bool,
}

/// One schedulable hour of a professional's weekly grid.
///
/// Composite identity is (professional_id, weekday, hour_start); the store
/// guarantees at most one slot per key so that value-based joins from fixed
/// schedule entries match at most one slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: i64,
    pub professional_id: i32,
    pub unit_id: Option<i32>,
    pub weekday: Weekday,
    pub period: Period,
    pub hour_start: String,
    pub hour_end: Option<String>,
    pub status: SlotStatus,
}

/// One schedulable hour of a room's weekly grid. Rooms have no period split
/// and no in-attendance bookkeeping; they start Available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSlot {
    pub id: i64,
    pub room_id: i32,
    pub weekday: Weekday,
    pub hour: String,
    pub status: SlotStatus,
}

/// Immutable record of one imported appointment occurrence. The table is
/// cleared wholesale at the start of every fixed-schedule import; entries are
/// append-only within a batch.
///
/// There is deliberately no foreign key to [`AvailabilitySlot`]: the join key
/// is (professional_id, weekday, hour), by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedScheduleEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hour: String,
    pub unit_name: String,
    pub room: Option<String>,
    pub professional_id: i32,
    pub professional_name: String,
    pub attendance_type: Option<String>,
    pub billing_code: Option<String>,
    pub session_count: Option<i32>,
    pub payment_kind: Option<String>,
    pub patient: Option<String>,
}

// ==============================================================================
// CREATION SHAPES (ids are assigned by the store)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAvailabilitySlot {
    pub professional_id: i32,
    pub unit_id: Option<i32>,
    pub weekday: Weekday,
    pub period: Period,
    pub hour_start: String,
    pub hour_end: Option<String>,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomSlot {
    pub room_id: i32,
    pub weekday: Weekday,
    pub hour: String,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFixedScheduleEntry {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hour: String,
    pub unit_name: String,
    pub room: Option<String>,
    pub professional_id: i32,
    pub professional_name: String,
    pub attendance_type: Option<String>,
    pub billing_code: Option<String>,
    pub session_count: Option<i32>,
    pub payment_kind: Option<String>,
    pub patient: Option<String>,
}
