//! Metadata extractor: scans the non-tabular preamble rows of a sheet for
//! named fields using label-prefix matching and colon-delimited values.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::cell::{Grid, RawCell, parse_date_flexible};
use crate::patterns::compile_literal;
use crate::structures::TournamentMetadata;

static ROUNDS_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"(\d+)"));
static RATE_OF_PLAY_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"^(.*?)\s*\(([^)]*)\)\s*$"));

/// Extracts metadata from rows `0..stop_row` of the grid.
///
/// `stop_row` is normally the ranking-section marker; when no marker exists
/// the caller passes a bounded row budget instead. `source` is the input
/// filename and is always recorded.
pub fn extract_metadata(grid: &Grid, stop_row: usize, source: &str) -> TournamentMetadata {
    let mut meta = TournamentMetadata {
        source: source.to_owned(),
        ..Default::default()
    };

    let end = stop_row.min(grid.row_count());
    for row_idx in 0..end {
        let label = grid.first_cell_text(row_idx).to_lowercase();
        let full_text = grid.row_text(row_idx);
        if full_text.is_empty() {
            continue;
        }

        // The first unlabeled preamble row is the tournament name.
        if meta.name.is_none() && !full_text.contains(':') {
            meta.name = Some(full_text.clone());
            trace!(row = row_idx, name = %full_text, "tournament name");
            continue;
        }

        let Some(value) = value_after_colon(&full_text) else {
            continue;
        };
        apply_labeled_field(&mut meta, row_idx, &label, &value);
    }

    debug!(
        source = %meta.source,
        name = ?meta.name,
        organizer = ?meta.organizer,
        date = ?meta.date,
        rounds = ?meta.rounds,
        "metadata extracted"
    );
    meta
}

/// Everything after the first colon of the joined row text, trimmed.
fn value_after_colon(text: &str) -> Option<String> {
    let (_, value) = text.split_once(':')?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

fn apply_labeled_field(meta: &mut TournamentMetadata, row_idx: usize, label: &str, value: &str) {
    if label.starts_with("organizer") || label.starts_with("organiser") {
        meta.organizer = Some(value.to_owned());
    } else if label.starts_with("federation") {
        meta.federation = Some(value.to_owned());
    } else if label.contains("deputy chief arbiter") {
        meta.deputy_chief_arbiter = Some(value.to_owned());
    } else if label.contains("chief arbiter") {
        meta.chief_arbiter = Some(value.to_owned());
    } else if label.contains("tournament director") {
        meta.tournament_director = Some(value.to_owned());
    } else if label.starts_with("arbiter") {
        meta.arbiter = Some(value.to_owned());
    } else if label.starts_with("location") || label.starts_with("town") || label.starts_with("place")
    {
        meta.location = Some(value.to_owned());
    } else if label.starts_with("date") {
        meta.date = parse_date_flexible(&RawCell::Text(value.to_owned()));
    } else if label.starts_with("time control") || label.starts_with("rate of play") {
        apply_time_control(meta, value);
    } else if label.starts_with("round") && ROUNDS_RE.is_match(value) {
        meta.rounds = first_number(value).map(|n| n as u32);
    } else if label.contains("rating") && (label.contains('ø') || label.contains("average")) {
        apply_rating_age(meta, value);
    } else if label.starts_with("average age") {
        meta.average_age = value.replace(',', ".").parse::<f64>().ok();
    } else if label.starts_with("tournament type") || label == "type" || label.starts_with("type:")
    {
        meta.tournament_type = Some(value.to_owned());
    } else if label.contains("rating calculation") || label.contains("calculation") {
        meta.rating_calculation = Some(value.to_owned());
    } else {
        trace!(row = row_idx, label = %label, "unrecognized preamble label");
    }
}

/// Splits `"90 min + 30 sec (standard)"` into the control string and the
/// trailing parenthesized rate-of-play.
fn apply_time_control(meta: &mut TournamentMetadata, value: &str) {
    if let Some(caps) = RATE_OF_PLAY_RE.captures(value) {
        let control = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let rate = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        if !control.is_empty() {
            meta.time_control = Some(control.to_owned());
        }
        if !rate.is_empty() {
            meta.rate_of_play = Some(rate.to_owned());
        }
    } else {
        meta.time_control = Some(value.to_owned());
    }
}

/// The combined `Rating-Ø / average age` field splits on `/` into exactly two
/// numeric parts.
fn apply_rating_age(meta: &mut TournamentMetadata, value: &str) {
    let mut parts = value.splitn(2, '/');
    if let Some(rating) = parts.next().and_then(first_number) {
        meta.average_rating = Some(rating as u32);
    }
    if let Some(age_part) = parts.next() {
        meta.average_age = first_decimal(age_part);
    }
}

fn first_number(text: &str) -> Option<u64> {
    ROUNDS_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn first_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    fn grid_of(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|s| RawCell::Text((*s).to_owned())).collect())
                .collect(),
        )
    }

    #[test]
    fn extracts_labeled_preamble_fields() {
        let grid = grid_of(&[
            &["Cape Town Open 2023"],
            &["Organizer(s):", "Cape Town Chess Club"],
            &["Federation:", "RSA"],
            &["Chief Arbiter:", "IA A. Smith"],
            &["Deputy Chief Arbiter:", "B. Jones"],
            &["Arbiter:", "C. Brown"],
            &["Location:", "Cape Town"],
            &["Date:", "2023/06/17"],
            &["Rounds:", "9"],
            &["Final Ranking"],
        ]);
        let meta = extract_metadata(&grid, 9, "open.xlsx");
        assert_eq!(meta.name.as_deref(), Some("Cape Town Open 2023"));
        assert_eq!(meta.organizer.as_deref(), Some("Cape Town Chess Club"));
        assert_eq!(meta.federation.as_deref(), Some("RSA"));
        assert_eq!(meta.chief_arbiter.as_deref(), Some("IA A. Smith"));
        assert_eq!(meta.deputy_chief_arbiter.as_deref(), Some("B. Jones"));
        assert_eq!(meta.arbiter.as_deref(), Some("C. Brown"));
        assert_eq!(meta.location.as_deref(), Some("Cape Town"));
        assert_eq!(meta.date.as_deref(), Some("2023-06-17"));
        assert_eq!(meta.rounds, Some(9));
        assert_eq!(meta.source, "open.xlsx");
    }

    /// "Chief Arbiter" and "Deputy Chief Arbiter" land in different fields
    /// regardless of declaration order.
    #[test]
    fn chief_and_deputy_arbiter_do_not_collide() {
        let grid = grid_of(&[
            &["Deputy Chief Arbiter:", "B. Jones"],
            &["Chief Arbiter:", "A. Smith"],
        ]);
        let meta = extract_metadata(&grid, 2, "t.xlsx");
        assert_eq!(meta.chief_arbiter.as_deref(), Some("A. Smith"));
        assert_eq!(meta.deputy_chief_arbiter.as_deref(), Some("B. Jones"));
    }

    #[test]
    fn time_control_splits_rate_of_play() {
        let grid = grid_of(&[&["Time Control:", "90 min + 30 sec/move (Standard)"]]);
        let meta = extract_metadata(&grid, 1, "t.xlsx");
        assert_eq!(meta.time_control.as_deref(), Some("90 min + 30 sec/move"));
        assert_eq!(meta.rate_of_play.as_deref(), Some("Standard"));
    }

    #[test]
    fn combined_rating_age_field_splits_in_two() {
        let grid = grid_of(&[&["Rating-Ø / average age:", "1850 / 23.4"]]);
        let meta = extract_metadata(&grid, 1, "t.xlsx");
        assert_eq!(meta.average_rating, Some(1850));
        assert_eq!(meta.average_age, Some(23.4));
    }

    /// Scanning stops at the section marker row; labels below it are table
    /// content, not metadata.
    #[test]
    fn extraction_respects_stop_row() {
        let grid = grid_of(&[
            &["My Open"],
            &["Final Ranking"],
            &["Organizer:", "Should Not Appear"],
        ]);
        let meta = extract_metadata(&grid, 1, "t.xlsx");
        assert_eq!(meta.name.as_deref(), Some("My Open"));
        assert_eq!(meta.organizer, None);
    }

    #[test]
    fn empty_grid_still_records_source() {
        let meta = extract_metadata(&Grid::default(), 10, "empty.xlsx");
        assert_eq!(meta.source, "empty.xlsx");
        assert_eq!(meta.name, None);
    }
}
