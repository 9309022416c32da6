//! Raw cell model and defensive value parsing.
//!
//! This module is the single normalization boundary between the spreadsheet
//! reader and the rest of the engine: every parser component works on
//! [`RawCell`] and [`Grid`] values and goes through [`clean_cell`] (or one of
//! the typed helpers) before touching a value. Nothing downstream ever sees
//! the spreadsheet library's own cell type.
//!
//! All parsing here is best-effort: malformed input yields `None` (or falls
//! back to the original text for dates), never an error.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::patterns::compile_literal;

/// A normalized spreadsheet cell: text, a number, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// A textual cell value (not yet trimmed).
    Text(String),
    /// A numeric cell value. Dates arrive here as spreadsheet serial numbers.
    Number(f64),
    /// An empty, blank, or unreadable cell.
    Empty,
}

const EMPTY_CELL: RawCell = RawCell::Empty;

/// A row-major grid of raw cells: the whole first worksheet of a workbook.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<RawCell>>,
}

impl Grid {
    /// Wraps a row-major cell matrix.
    pub fn from_rows(rows: Vec<Vec<RawCell>>) -> Self {
        Self { rows }
    }

    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns a row as a slice, or `None` past the end of the grid.
    pub fn row(&self, row_idx: usize) -> Option<&[RawCell]> {
        self.rows.get(row_idx).map(Vec::as_slice)
    }

    /// Returns the cell at (`row_idx`, `col_idx`); missing cells read as empty.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> &RawCell {
        self.rows
            .get(row_idx)
            .and_then(|r| r.get(col_idx))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cleaned text of the first cell of a row (the "column A" text).
    pub fn first_cell_text(&self, row_idx: usize) -> String {
        clean_cell(self.cell(row_idx, 0))
    }

    /// All non-empty cells of a row joined with single spaces.
    ///
    /// Metadata rows often spread one logical `label: value` line across
    /// several cells; the joined form is what label matching runs against.
    pub fn row_text(&self, row_idx: usize) -> String {
        let Some(row) = self.rows.get(row_idx) else {
            return String::new();
        };
        let parts: Vec<String> = row
            .iter()
            .map(clean_cell)
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }
}

/// Converts any raw cell to a trimmed string. Never fails.
///
/// Whole numbers render without a decimal point so that a rank stored as the
/// float `3.0` cleans to `"3"`.
pub fn clean_cell(raw: &RawCell) -> String {
    match raw {
        RawCell::Text(s) => s.trim().to_owned(),
        RawCell::Number(f) => {
            if *f == f.floor() && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        RawCell::Empty => String::new(),
    }
}

/// Parses a base-10 integer out of a cell; empty, `"-"`, and non-numeric
/// values yield `None`.
pub fn parse_int_or_none(raw: &RawCell) -> Option<i64> {
    match raw {
        RawCell::Number(f) => {
            if *f == f.floor() && f.abs() < 1e15 {
                Some(*f as i64)
            } else {
                None
            }
        }
        RawCell::Text(_) | RawCell::Empty => {
            let s = clean_cell(raw);
            if s.is_empty() || s == "-" {
                return None;
            }
            s.parse::<i64>().ok()
        }
    }
}

/// Parses a decimal out of a cell; accepts a comma decimal separator.
///
/// Empty, `"-"`, and non-numeric values yield `None`.
pub fn parse_decimal_or_none(raw: &RawCell) -> Option<f64> {
    match raw {
        RawCell::Number(f) => Some(*f),
        RawCell::Text(_) | RawCell::Empty => {
            let s = clean_cell(raw);
            if s.is_empty() || s == "-" {
                return None;
            }
            s.replace(',', ".").parse::<f64>().ok()
        }
    }
}

// Serial day numbers use the 1899-12-30 epoch for values past the phantom
// 1900-02-29 (serial 60); smaller serials use 1899-12-31.
const SERIAL_LEAP_BUG_CUTOFF: f64 = 59.0;
const SERIAL_MAX_PLAUSIBLE: f64 = 200_000.0;

static YMD_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})"));
static DMY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})"));

/// Extracts the first recognizable date from a cell as an ISO `YYYY-MM-DD`
/// string.
///
/// Handles, in order:
/// - spreadsheet serial day numbers (epoch 1899-12-30, with the historical
///   1900 leap-year-bug offset applied for serials above 59),
/// - `YYYY/MM/DD`-style strings (also `-` and `.` separators), including a
///   start date embedded in a larger range string,
/// - `DD.MM.YYYY`-style strings.
///
/// Any cell that holds text but no recognizable date comes back unchanged as
/// a fallback; only a blank cell yields `None`. Already-ISO input is returned
/// as-is, so the function is idempotent.
pub fn parse_date_flexible(raw: &RawCell) -> Option<String> {
    if let RawCell::Number(serial) = raw {
        if let Some(date) = serial_to_date(*serial) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
        let s = clean_cell(raw);
        return if s.is_empty() { None } else { Some(s) };
    }

    let text = clean_cell(raw);
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = YMD_RE.captures(&text) {
        if let Some(date) = ymd_from_captures(&caps, 1, 2, 3) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    if let Some(caps) = DMY_RE.captures(&text) {
        if let Some(date) = ymd_from_captures(&caps, 3, 2, 1) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    Some(text)
}

/// Converts a spreadsheet serial day number to a calendar date.
///
/// Returns `None` for serials that are non-positive or implausibly large.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(serial > 0.0 && serial <= SERIAL_MAX_PLAUSIBLE) {
        return None;
    }
    let days = serial.floor() as u64;
    let epoch = if serial > SERIAL_LEAP_BUG_CUTOFF {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    }?;
    epoch.checked_add_days(Days::new(days))
}

fn ymd_from_captures(
    caps: &regex::Captures<'_>,
    year_idx: usize,
    month_idx: usize,
    day_idx: usize,
) -> Option<NaiveDate> {
    let year: i32 = caps.get(year_idx)?.as_str().parse().ok()?;
    let month: u32 = caps.get(month_idx)?.as_str().parse().ok()?;
    let day: u32 = caps.get(day_idx)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
