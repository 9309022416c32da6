//! Structural locator: finds the ranking-section marker, the header row
//! beneath it, and the footer row that ends the data block.
//!
//! Exported sheets carry no named ranges or fixed layout; structure has to be
//! found inside loose text. A missed header row is the dominant real-world
//! parse failure and surfaces as a metadata-only result upstream, never as an
//! error.

use regex::Regex;
use tracing::{debug, trace};

use crate::cell::{Grid, clean_cell};

/// Finds the first row whose column-A text contains any of the marker
/// phrases (case-insensitive). Returns `None` when no row matches.
pub fn find_section_marker(grid: &Grid, phrases: &[&str]) -> Option<usize> {
    for row_idx in 0..grid.row_count() {
        let text = grid.first_cell_text(row_idx).to_lowercase();
        if text.is_empty() {
            continue;
        }
        if phrases.iter().any(|p| text.contains(p)) {
            debug!(row = row_idx, text = %text, "section marker found");
            return Some(row_idx);
        }
    }
    debug!("no section marker found");
    None
}

/// Scans up to `window` rows after `after_idx` for a header row.
///
/// A row qualifies when every required pattern matches at least one of its
/// cleaned, lowercased cells. Returns `None` when the window is exhausted.
pub fn find_header_row(
    grid: &Grid,
    after_idx: usize,
    required: &[&Regex],
    window: usize,
) -> Option<usize> {
    find_header_row_from(grid, after_idx.saturating_add(1), required, window)
}

/// Like [`find_header_row`] but scanning from `start` itself.
///
/// Used when no section marker exists and the whole sheet is searched.
pub fn find_header_row_from(
    grid: &Grid,
    start: usize,
    required: &[&Regex],
    window: usize,
) -> Option<usize> {
    let end = start.saturating_add(window).min(grid.row_count());
    for row_idx in start..end {
        let Some(row) = grid.row(row_idx) else {
            break;
        };
        let cells: Vec<String> = row
            .iter()
            .map(|c| clean_cell(c).to_lowercase())
            .collect();
        let all_present = required
            .iter()
            .all(|re| cells.iter().any(|cell| re.is_match(cell)));
        if all_present {
            debug!(row = row_idx, "header row found");
            return Some(row_idx);
        }
        trace!(row = row_idx, cells = ?cells, "row rejected as header");
    }
    None
}

/// Returns true when a row looks like the export footer: vendor names,
/// a "program" credit line, or a URL-like token.
pub fn is_footer_row(grid: &Grid, row_idx: usize, signatures: &[&str]) -> bool {
    let text = grid.row_text(row_idx).to_lowercase();
    if text.is_empty() {
        return false;
    }
    let url_like = text.contains("http://") || text.contains("https://") || text.contains("www.");
    url_like || signatures.iter().any(|s| text.contains(s))
}
