// libs/shared/utils/src/normalize.rs
//
// Spreadsheet cells arrive in whatever shape the clinic's staff typed them
// in. Everything here folds that noise into the canonical forms the rest of
// the system works with: "HH:MM" hour strings, simplified weekday names and
// accent-free lookup text.

use std::sync::OnceLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use thiserror::Error;

use shared_models::entities::Weekday;

use crate::rows::CellValue;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("invalid time value: {0}")]
    InvalidTime(String),
}

// ==============================================================================
// TEXT
// ==============================================================================

/// Replace accented characters with their plain counterparts.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            _ => c,
        })
        .collect()
}

/// Lower-case, accent-free, alphanumeric-and-spaces-only, single-spaced.
/// Used for column-header matching and unit-name lookups.
pub fn normalize_text(text: &str) -> String {
    let folded = strip_accents(text).to_lowercase();
    let cleaned: String = folded
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==============================================================================
// TIME
// ==============================================================================

fn digit_groups(raw: &str) -> Vec<u32> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit pattern compiles"));
    re.find_iter(raw)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

fn format_hhmm(hour: u32, minute: u32, raw: &str) -> Result<String, NormalizeError> {
    if hour > 23 || minute > 59 {
        return Err(NormalizeError::InvalidTime(raw.to_string()));
    }
    Ok(format!("{:02}:{:02}", hour, minute))
}

fn time_from_number(value: f64, raw: &str) -> Result<String, NormalizeError> {
    if !value.is_finite() || value < 0.0 {
        return Err(NormalizeError::InvalidTime(raw.to_string()));
    }
    // Integer part is the hour; the fraction is a fraction of an hour, so
    // 8.5 reads as 08:30.
    let hour = value.trunc() as u32;
    let minute = (value.fract() * 60.0) as u32;
    format_hhmm(hour, minute, raw)
}

fn time_from_text(raw: &str) -> Result<String, NormalizeError> {
    let mut text = raw.trim().to_lowercase();
    if text.is_empty() {
        return Err(NormalizeError::InvalidTime(raw.to_string()));
    }

    // Unify the separators people actually type: 7h30, 7hs, 7hrs, 7.30.
    for sep in ["hrs", "hs", "h", "."] {
        text = text.replace(sep, ":");
    }
    if text.ends_with(':') {
        text.push_str("00");
    }

    if text.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(hour) = text.parse::<u32>() {
            return format_hhmm(hour, 0, raw);
        }
    }

    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if parts.len() == 2 || parts.len() == 3 {
        // HH:MM or HH:MM:SS; seconds are dropped.
        if let (Ok(hour), Ok(minute)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
            return format_hhmm(hour, minute, raw);
        }
    }

    // Last resort: fish the numbers out of free text.
    let groups = digit_groups(&text);
    match groups.as_slice() {
        [hour, minute, ..] => format_hhmm(*hour, *minute, raw),
        [hour] => format_hhmm(*hour, 0, raw),
        [] => Err(NormalizeError::InvalidTime(raw.to_string())),
    }
}

/// Normalize a spreadsheet time cell to the canonical "HH:MM" form.
pub fn normalize_time(value: &CellValue) -> Result<String, NormalizeError> {
    match value {
        CellValue::Text(raw) => time_from_text(raw),
        CellValue::Number(n) => time_from_number(*n, &n.to_string()),
        CellValue::Bool(b) => Err(NormalizeError::InvalidTime(b.to_string())),
        CellValue::Empty => Err(NormalizeError::InvalidTime("<empty>".to_string())),
    }
}

// ==============================================================================
// WEEKDAYS AND DATES
// ==============================================================================

const WEEKDAY_TABLE: [(&str, Weekday); 7] = [
    ("segunda", Weekday::Monday),
    ("terca", Weekday::Tuesday),
    ("quarta", Weekday::Wednesday),
    ("quinta", Weekday::Thursday),
    ("sexta", Weekday::Friday),
    ("sabado", Weekday::Saturday),
    ("domingo", Weekday::Sunday),
];

/// Match a free-text weekday cell against the Portuguese spellings, with or
/// without the "-feira" suffix and regardless of accents or case. Returns
/// `None` when nothing matches; callers treat that as skip-this-row, never
/// as a fatal error.
pub fn normalize_weekday(raw: &str) -> Option<Weekday> {
    let needle = normalize_text(raw);
    if needle.is_empty() {
        return None;
    }
    WEEKDAY_TABLE
        .iter()
        .find(|(key, _)| needle.contains(key))
        .map(|(_, day)| *day)
}

// Excel's day zero.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Parse a spreadsheet date cell: dd/mm/yyyy, ISO dates (with or without a
/// trailing time), or an Excel serial day number.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Text(raw) => {
            let text = raw.trim();
            if text.is_empty() {
                return None;
            }
            for fmt in ["%d/%m/%Y", "%Y-%m-%d", "%d/%m/%y"] {
                if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
                    return Some(date);
                }
            }
            // Datetime strings: take the date prefix.
            let prefix: String = text.chars().take(10).collect();
            for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
                if let Ok(date) = NaiveDate::parse_from_str(&prefix, fmt) {
                    return Some(date);
                }
            }
            None
        }
        CellValue::Number(serial) => {
            if !serial.is_finite() || *serial < 1.0 {
                return None;
            }
            let (y, m, d) = EXCEL_EPOCH;
            NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|epoch| epoch.checked_add_days(Days::new(serial.trunc() as u64)))
        }
        _ => None,
    }
}
