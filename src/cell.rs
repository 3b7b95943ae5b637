//! Typed cell values and the read-only grid they arrive in.
//!
//! The spreadsheet decoding library hands this engine a rectangular grid of
//! already-decoded values per sheet. Source files are hand-maintained, so a
//! column may hold text in one row and a number or date in the next; every
//! coercion below is total, with exactly one documented fallback, so the
//! parsing code never has to scatter ad hoc default literals.

use crate::error::{Result, WorkbookError};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single decoded spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Numeric view of the cell. Text is trimmed and parsed; anything
    /// non-numeric coerces to 0.0.
    pub fn as_number(&self) -> f64 {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Cell::Empty | Cell::Date(_) => 0.0,
        }
    }

    /// Date view of the cell. Text is tried against the formats the source
    /// files actually use; anything unparseable is "no date".
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => {
                let s = s.trim();
                for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"] {
                    if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                        return Some(d);
                    }
                }
                None
            }
            Cell::Empty | Cell::Number(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Trimmed text, the form every label lookup matches against.
    pub fn text_trimmed(&self) -> Option<String> {
        self.as_text().map(|s| s.trim().to_string())
    }

    /// Empty, or text that is only whitespace. The source format has no
    /// single absent-value sentinel, so both count as "nothing here".
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One sheet of the uploaded workbook: a name and its rows, as decoded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Cell at (row, col), with out-of-bounds reads coming back Empty.
    /// Rows in these files are ragged; callers never need to bounds-check.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The full upload: every sheet of one file, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Extension gate, checked before any parse attempt.
    pub fn check_extension(file_name: &str) -> Result<()> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Ok(())
        } else {
            Err(WorkbookError::UnrecognizedFileType(file_name.to_string()))
        }
    }
}
