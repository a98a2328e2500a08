// libs/shared/utils/src/rows.rs
//
// The tabular-reader contract: an uploaded spreadsheet reaches the backend as
// a list of rows, each mapping a column header to a cell value. Headers are
// normalized (trimmed, lower-cased, accent-stripped) before any matching, and
// fully empty rows are dropped at ingestion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_text;

/// One spreadsheet cell. Untagged so JSON payloads map directly: strings,
/// numbers, booleans and nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell as display text, preserving leading zeros in codes that arrived
    /// as strings and collapsing numbers like 101.0 to "101". Excel formula
    /// remnants ("=...", stray quotes) are cleaned off.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            CellValue::Text(raw) => {
                let cleaned = raw.trim_start_matches('=').replace(['"', '\''], "");
                let cleaned = cleaned.trim();
                if cleaned.is_empty() {
                    None
                } else {
                    Some(cleaned.to_string())
                }
            }
        }
    }

    /// Cell as an integer, accepting "101", "101.0" and numeric cells alike.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            CellValue::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64))
            }
            _ => None,
        }
    }
}

const EMPTY_CELL: CellValue = CellValue::Empty;

/// One row of an imported sheet, keyed by normalized header.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    cells: BTreeMap<String, CellValue>,
}

impl SheetRow {
    pub fn from_cells(raw: impl IntoIterator<Item = (String, CellValue)>) -> Self {
        let cells = raw
            .into_iter()
            .map(|(header, value)| (normalize_text(&header), value))
            .collect();
        Self { cells }
    }

    /// Look a cell up by column name; the name is normalized the same way
    /// headers were. Missing columns read as an empty cell.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(&normalize_text(column)).unwrap_or(&EMPTY_CELL)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(&normalize_text(column))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

/// Ingest raw reader output: normalize headers, drop fully empty rows.
pub fn ingest_rows(raw: Vec<BTreeMap<String, CellValue>>) -> Vec<SheetRow> {
    raw.into_iter()
        .map(SheetRow::from_cells)
        .filter(|row| !row.is_empty())
        .collect()
}
