// libs/schedule-cell/src/models.rs
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::entities::{AvailabilitySlot, Period, SlotStatus, Weekday};
use shared_utils::normalize::{normalize_time, normalize_weekday, parse_date, NormalizeError};
use shared_utils::rows::{CellValue, SheetRow};

// ==============================================================================
// IMPORT COLUMN NAMES (matched against normalized headers)
// ==============================================================================

pub const COL_PROFESSIONAL_ID: &str = "id profissional";
pub const COL_DATE: &str = "data";
pub const COL_START_HOUR: &str = "hora inicial";
pub const COL_UNIT: &str = "unidade";
pub const COL_PROFESSIONAL_NAME: &str = "profissional";
pub const COL_ROOM: &str = "sala";
pub const COL_ATTENDANCE_TYPE: &str = "tipo atend";
pub const COL_BILLING_CODE: &str = "codigo faturamento";
pub const COL_SESSION_COUNT: &str = "qtd sess";
pub const COL_PAYMENT: &str = "pagamento";
pub const COL_PATIENT: &str = "paciente";

pub const COL_BLOCK_WEEKDAY: &str = "dia da semana";
pub const COL_BLOCK_HOUR: &str = "periodo";

pub const COL_REGISTRY_NAME: &str = "nome profissional";
pub const COL_REGISTRY_STATUS: &str = "status";

/// The serviced window: schedule entries must start between these hours,
/// inclusive.
pub const FIRST_SERVICED_HOUR: u32 = 7;
pub const LAST_SERVICED_HOUR: u32 = 18;

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Batch-fatal import failures. Anything here aborts the import with zero
/// mutations visible.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("required columns missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {0}: professional id is empty")]
    NullProfessionalId(usize),

    #[error("{} rows failed validation; resubmit with confirm_invalid to apply the valid ones", .0.len())]
    ConfirmationRequired(Vec<String>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Row-local failures. These are recorded as diagnostics on the import
/// outcome and never abort the batch.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("professional id {0:?} is not a number")]
    InvalidProfessionalId(String),

    #[error("professional name is empty")]
    EmptyProfessionalName,

    #[error("could not resolve a weekday from date value {0:?}")]
    WeekdayResolution(String),

    #[error("unrecognized weekday {0:?}")]
    InvalidWeekday(String),

    #[error("invalid start hour: {0}")]
    InvalidHour(#[from] NormalizeError),

    #[error("start hour {0} outside the serviced window (07:00-18:00)")]
    HourOutOfRange(String),

    #[error("unit name is empty")]
    EmptyUnitName,

    #[error("unit could not be created: {0}")]
    UnitResolution(String),

    #[error("professional {0} not found")]
    ProfessionalNotFound(i32),

    #[error("room {0} not found")]
    RoomNotFound(i32),

    #[error("no slot for professional {professional_id} on {} at {hour}", .weekday.short_pt())]
    SlotNotFound {
        professional_id: i32,
        weekday: Weekday,
        hour: String,
    },
}

// ==============================================================================
// TYPED IMPORT ROWS
// ==============================================================================

fn professional_id_of(cell: &CellValue) -> Result<i32, RowError> {
    cell.as_int()
        .map(|id| id as i32)
        .ok_or_else(|| RowError::InvalidProfessionalId(cell.as_text().unwrap_or_default()))
}

/// One validated fixed-schedule row. Parsing fails fast per field; the
/// weekday always comes from the date, never from a free-text column.
#[derive(Debug, Clone)]
pub struct FixedScheduleRow {
    pub professional_id: i32,
    pub professional_name: String,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hour: String,
    pub period: Period,
    pub unit_name: String,
    pub room: Option<String>,
    pub attendance_type: Option<String>,
    pub billing_code: Option<String>,
    pub session_count: Option<i32>,
    pub payment_kind: Option<String>,
    pub patient: Option<String>,
}

impl FixedScheduleRow {
    pub fn parse(row: &SheetRow) -> Result<Self, RowError> {
        let professional_id = professional_id_of(row.get(COL_PROFESSIONAL_ID))?;
        let professional_name = row
            .get(COL_PROFESSIONAL_NAME)
            .as_text()
            .ok_or(RowError::EmptyProfessionalName)?;

        let date_cell = row.get(COL_DATE);
        let date = parse_date(date_cell)
            .ok_or_else(|| RowError::WeekdayResolution(date_cell.as_text().unwrap_or_default()))?;
        let weekday = Weekday::from_date(date);

        let hour = normalize_time(row.get(COL_START_HOUR))?;
        let hour_value: u32 = hour[..2].parse().unwrap_or(0);
        if !(FIRST_SERVICED_HOUR..=LAST_SERVICED_HOUR).contains(&hour_value) {
            return Err(RowError::HourOutOfRange(hour));
        }
        let period = Period::from_hour(hour_value);

        let unit_name = crate::services::units::canonical_unit_name(
            &row.get(COL_UNIT).as_text().unwrap_or_default(),
        );
        if unit_name.is_empty() {
            return Err(RowError::EmptyUnitName);
        }

        Ok(Self {
            professional_id,
            professional_name,
            date,
            weekday,
            hour,
            period,
            unit_name,
            room: row.get(COL_ROOM).as_text(),
            attendance_type: row.get(COL_ATTENDANCE_TYPE).as_text(),
            billing_code: row.get(COL_BILLING_CODE).as_text(),
            session_count: row.get(COL_SESSION_COUNT).as_int().map(|n| n as i32),
            payment_kind: row.get(COL_PAYMENT).as_text(),
            patient: row.get(COL_PATIENT).as_text(),
        })
    }
}

/// One validated blockage row. The PERIODO column carries the hour.
#[derive(Debug, Clone)]
pub struct BlockageRow {
    pub professional_id: i32,
    pub weekday: Weekday,
    pub hour: String,
}

impl BlockageRow {
    pub fn parse(row: &SheetRow) -> Result<Self, RowError> {
        let weekday_cell = row.get(COL_BLOCK_WEEKDAY);
        let weekday_text = weekday_cell.as_text().unwrap_or_default();
        let weekday = normalize_weekday(&weekday_text)
            .ok_or_else(|| RowError::InvalidWeekday(weekday_text.clone()))?;

        let hour = normalize_time(row.get(COL_BLOCK_HOUR))?;
        let professional_id = professional_id_of(row.get(COL_PROFESSIONAL_ID))?;

        Ok(Self {
            professional_id,
            weekday,
            hour,
        })
    }
}

/// One validated professional-registry row.
#[derive(Debug, Clone)]
pub struct RegistryRow {
    pub id: i32,
    pub name: String,
    pub room_id: Option<i32>,
    pub active: bool,
}

impl RegistryRow {
    pub fn parse(row: &SheetRow) -> Result<Self, RowError> {
        let id = professional_id_of(row.get(COL_PROFESSIONAL_ID))?;
        let name = row
            .get(COL_REGISTRY_NAME)
            .as_text()
            .ok_or(RowError::EmptyProfessionalName)?;
        let room_id = row.get(COL_ROOM).as_int().map(|n| n as i32);
        // Anything other than "Ativo" deactivates; a missing column keeps
        // the professional active.
        let active = match row.get(COL_REGISTRY_STATUS).as_text() {
            Some(status) => shared_utils::normalize_text(&status) == "ativo",
            None => true,
        };
        Ok(Self {
            id,
            name,
            room_id,
            active,
        })
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ImportPayload {
    pub rows: Vec<BTreeMap<String, CellValue>>,
}

#[derive(Debug, Deserialize)]
pub struct BlockageImportPayload {
    pub rows: Vec<BTreeMap<String, CellValue>>,
    #[serde(default)]
    pub confirm_invalid: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProfessionalRequest {
    pub id: i32,
    pub name: String,
    pub room_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUnitRequest {
    pub name: String,
    #[serde(default)]
    pub serves_saturday: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotFilters {
    pub unit_id: Option<i32>,
    pub professional_id: Option<i32>,
    pub weekday: Option<Weekday>,
    pub period: Option<Period>,
    pub status: Option<SlotStatus>,
}

impl SlotFilters {
    pub fn matches(&self, slot: &AvailabilitySlot) -> bool {
        self.unit_id.map_or(true, |id| slot.unit_id == Some(id))
            && self
                .professional_id
                .map_or(true, |id| slot.professional_id == id)
            && self.weekday.map_or(true, |day| slot.weekday == day)
            && self.period.map_or(true, |period| slot.period == period)
            && self.status.map_or(true, |status| slot.status == status)
    }
}

/// A slot joined with its professional and unit names, for query responses.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub professional_id: i32,
    pub professional_name: String,
    pub unit_name: Option<String>,
    pub weekday: Weekday,
    pub period: Period,
    pub hour_start: String,
    pub hour_end: Option<String>,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilitySummary {
    pub active_professionals: usize,
    pub available: usize,
    pub in_attendance: usize,
    pub blocked: usize,
}

// ==============================================================================
// IMPORT OUTCOMES
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct FixedImportOutcome {
    pub batch_id: Uuid,
    pub processed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub incomplete_professionals: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct BlockageOutcome {
    pub batch_id: Uuid,
    pub processed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub professionals_affected: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistryOutcome {
    pub batch_id: Uuid,
    pub processed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// What removing a professional actually did: professionals that still own
/// slots are deactivated instead of deleted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalKind {
    Deactivated,
    Deleted,
}
