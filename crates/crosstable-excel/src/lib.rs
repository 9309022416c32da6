/// Excel entry points for the crosstable tournament parser.
///
/// This crate opens an `.xlsx`/`.xls` workbook from a byte stream, converts
/// the first worksheet to the engine's raw-cell grid, and runs one of the
/// four format strategies from `crosstable-core`. The `calamine` dependency
/// is confined to this crate and does not bleed into the core engine.
///
/// The only error surface is the workbook container itself: an unreadable
/// buffer fails, everything else parses best-effort. The caller selects the
/// format; nothing here auto-detects one.
use std::io::{Read, Seek};

use calamine::{Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crosstable_core::{
    Diagnostic, FormatProfile, Grid, TeamRoundData, TournamentData, parse_individual,
    validate_team_round,
};

pub mod error;
mod sheet;

pub use error::ImportError;

/// Parses a legacy Swiss (chess-results style) export.
///
/// `filename` is recorded as the `source` metadata field.
///
/// # Errors
///
/// Returns [`ImportError`] only when the workbook container cannot be read.
pub fn parse_swiss<R: Read + Seek + Clone>(
    reader: R,
    filename: &str,
) -> Result<TournamentData, ImportError> {
    let grid = read_first_sheet(reader)?;
    Ok(parse_individual(&grid, &FormatProfile::swiss(), filename))
}

/// Parses an enhanced Swiss-Manager export with labeled tie-break columns.
///
/// # Errors
///
/// Returns [`ImportError`] only when the workbook container cannot be read.
pub fn parse_swiss_manager<R: Read + Seek + Clone>(
    reader: R,
    filename: &str,
) -> Result<TournamentData, ImportError> {
    let grid = read_first_sheet(reader)?;
    Ok(parse_individual(&grid, &FormatProfile::swiss_manager(), filename))
}

/// Parses a round-robin cross-table export.
///
/// # Errors
///
/// Returns [`ImportError`] only when the workbook container cannot be read.
pub fn parse_round_robin<R: Read + Seek + Clone>(
    reader: R,
    filename: &str,
) -> Result<TournamentData, ImportError> {
    let grid = read_first_sheet(reader)?;
    Ok(parse_individual(&grid, &FormatProfile::round_robin(), filename))
}

/// Parses a team/board-match round report.
///
/// Cross-check diagnostics (board-sum mismatches, implausible board counts)
/// are returned alongside the data; they never block output.
///
/// # Errors
///
/// Returns [`ImportError`] only when the workbook container cannot be read.
pub fn parse_team_round<R: Read + Seek + Clone>(
    reader: R,
    filename: &str,
) -> Result<(TeamRoundData, Vec<Diagnostic>), ImportError> {
    let grid = read_first_sheet(reader)?;
    let data = crosstable_core::parse_team_round(&grid, filename);
    let diagnostics = validate_team_round(&data);
    Ok((data, diagnostics))
}

// Container auto-detection re-reads the stream, hence the `Clone` bound;
// callers hand in an in-memory buffer such as `Cursor<Vec<u8>>`.
fn read_first_sheet<R: Read + Seek + Clone>(reader: R) -> Result<Grid, ImportError> {
    let mut workbook =
        open_workbook_auto_from_rs(reader).map_err(|e| ImportError::WorkbookRead {
            detail: e.to_string(),
        })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)?
        .map_err(|e| ImportError::WorkbookRead {
            detail: e.to_string(),
        })?;
    debug!(
        rows = range.height(),
        cols = range.width(),
        "first worksheet read"
    );
    Ok(sheet::range_to_grid(&range))
}
