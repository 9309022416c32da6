//! Team/board-match round parser.
//!
//! Unlike the individual formats, a team round report interleaves two row
//! shapes below one header: pairing rows (`"3.1  2  Kings SC  4½:1½  Pawns
//! United  5"`) and the board rows of the most recent pairing. The walk keeps
//! a "current pairing" cursor that board rows attach to and that resets on
//! every new pairing row.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::cell::{Grid, RawCell, clean_cell, parse_int_or_none};
use crate::locate::{find_header_row, find_header_row_from, find_section_marker, is_footer_row};
use crate::metadata::extract_metadata;
use crate::patterns::compile_literal;
use crate::profile::FormatProfile;
use crate::structures::{BoardPairing, TeamPairing, TeamRoundData, TeamTournamentMetadata};
use crate::tokens::{decode_board_result, decode_team_match_score};

// "3", "18.2".
static PAIRING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"^\d+(\.\d+)?$"));
static DOTTED_PAIRING_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"^\d+\.\d+$"));
// "round7", "Round 7", "R7", "rd_7" in a filename or a marker line. `_` is a
// word character, so a plain \b would miss "teams_round7".
static ROUND_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"(?i)(?:\b|_)(?:round|rd|r)[\s._-]*(\d+)"));

const MAX_BOARD_NUMBER: u32 = 12;
const RATING_MIN: i64 = 100;
const RATING_MAX: i64 = 3500;
const MAX_TEAM_RANK: i64 = 999;

const TITLE_TOKENS: &[&str] = &[
    "GM", "IM", "FM", "CM", "NM", "WGM", "WIM", "WFM", "WCM", "AGM", "AIM", "AFM", "ACM",
];

/// Parses one team-round sheet into pairings with nested board results.
///
/// Fail-soft like the individual pipeline: a missing header yields a
/// metadata-only result. The round number is taken from the filename or the
/// section-marker line when either carries a `round N` hint.
pub fn parse_team_round(grid: &Grid, source: &str) -> TeamRoundData {
    let profile = FormatProfile::team_round();
    debug!(source, rows = grid.row_count(), "team round parse start");

    let marker = find_section_marker(grid, profile.section_phrases);
    let metadata_stop = marker.unwrap_or(profile.metadata_row_budget);
    let base = extract_metadata(grid, metadata_stop, source);
    let round = round_hint(source).or_else(|| marker.and_then(|m| round_hint(&grid.row_text(m))));
    let metadata = TeamTournamentMetadata { base, round };

    let patterns = profile.required_headers.patterns();
    let header_row = match marker {
        Some(m) => find_header_row(grid, m, &patterns, profile.header_window),
        None => find_header_row_from(grid, 0, &patterns, grid.row_count()),
    };
    let Some(header_idx) = header_row else {
        warn!(source, "no header row found; returning metadata-only result");
        return TeamRoundData {
            tournament_metadata: metadata,
            team_pairings: Vec::new(),
        };
    };

    let mut pairings: Vec<TeamPairing> = Vec::new();
    let mut current: Option<TeamPairing> = None;

    for row_idx in (header_idx + 1)..grid.row_count() {
        if is_footer_row(grid, row_idx, profile.footer_signatures) {
            debug!(row = row_idx, "footer reached; extraction stops");
            break;
        }
        let Some(row) = grid.row(row_idx) else {
            break;
        };

        match classify_row(row, current.is_some()) {
            TeamRow::Pairing(pairing) => {
                trace!(row = row_idx, number = %pairing.pairing_number, "pairing row");
                if let Some(done) = current.replace(pairing) {
                    pairings.push(finalize(done));
                }
            }
            TeamRow::Board(board) => match current.as_mut() {
                Some(pairing) => {
                    trace!(row = row_idx, board = board.board_number, "board row");
                    pairing.boards.push(board);
                }
                None => {
                    trace!(row = row_idx, "board row before any pairing skipped");
                }
            },
            TeamRow::Other => {
                trace!(row = row_idx, "row yields no pairing or board; skipped");
            }
        }
    }
    if let Some(done) = current.take() {
        pairings.push(finalize(done));
    }

    debug!(pairings = pairings.len(), round = ?metadata.round, "team round parse done");
    TeamRoundData {
        tournament_metadata: metadata,
        team_pairings: pairings,
    }
}

fn round_hint(text: &str) -> Option<u32> {
    ROUND_HINT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

enum TeamRow {
    Pairing(TeamPairing),
    Board(BoardPairing),
    Other,
}

/// Both row shapes start with a number, so the split is contextual: inside a
/// pairing a plain integer up to the board limit is the next board; a dotted
/// number (or an integer too large for a board) starts a new pairing.
fn classify_row(row: &[RawCell], in_pairing: bool) -> TeamRow {
    let Some((first_idx, first)) = first_non_empty(row) else {
        return TeamRow::Other;
    };
    if !PAIRING_NUMBER_RE.is_match(&first) {
        return TeamRow::Other;
    }

    let dotted = DOTTED_PAIRING_RE.is_match(&first);
    let board_number = if dotted { None } else { first.parse::<u32>().ok() };
    let small_number = board_number.is_some_and(|n| (1..=MAX_BOARD_NUMBER).contains(&n));

    if small_number && !in_pairing && has_player_signals(row) {
        // A board-shaped row (ratings, title tokens) with no pairing to
        // attach to; never a pairing of individuals.
        return TeamRow::Other;
    }

    if small_number && in_pairing {
        if let Some(n) = board_number {
            if let Some(board) = parse_board_row(row, first_idx, n) {
                return TeamRow::Board(board);
            }
        }
        return TeamRow::Other;
    }

    match parse_pairing_row(row, first_idx, &first) {
        Some(pairing) => TeamRow::Pairing(pairing),
        None => TeamRow::Other,
    }
}

/// Rating-range integers or title tokens mark a row as holding individual
/// players rather than teams.
fn has_player_signals(row: &[RawCell]) -> bool {
    row.iter().any(|cell| {
        if let Some(n) = parse_int_or_none(cell) {
            return (RATING_MIN..=RATING_MAX).contains(&n);
        }
        TITLE_TOKENS.contains(&clean_cell(cell).to_uppercase().as_str())
    })
}

/// A pairing row needs a decodable match score with a team name on each side
/// of it.
fn parse_pairing_row(row: &[RawCell], number_idx: usize, number: &str) -> Option<TeamPairing> {
    let (score_idx, score) = row
        .iter()
        .enumerate()
        .skip(number_idx + 1)
        .find_map(|(i, c)| decode_team_match_score(&clean_cell(c)).map(|s| (i, s)))?;

    let (white_team, white_rank) = parse_team_side(&row[number_idx + 1..score_idx]);
    let (black_team, black_rank) = parse_team_side(row.get(score_idx + 1..).unwrap_or(&[]));

    Some(TeamPairing {
        pairing_number: number.to_owned(),
        white_team: white_team?,
        black_team: black_team?,
        white_rank,
        black_rank,
        white_score: Some(score.white),
        black_score: Some(score.black),
        is_forfeit: score.is_forfeit,
        boards: Vec::new(),
    })
}

/// Text cells on one side of the score joined into the team name; a small
/// integer beside them is the team's rank in the standings.
fn parse_team_side(cells: &[RawCell]) -> (Option<String>, Option<u32>) {
    let mut name_parts: Vec<String> = Vec::new();
    let mut rank = None;
    for cell in cells {
        if let Some(n) = parse_int_or_none(cell) {
            if (1..=MAX_TEAM_RANK).contains(&n) && rank.is_none() {
                rank = Some(n as u32);
            }
            continue;
        }
        let text = clean_cell(cell);
        if !text.is_empty() {
            name_parts.push(text);
        }
    }
    let name = if name_parts.is_empty() {
        None
    } else {
        Some(name_parts.join(" "))
    };
    (name, rank)
}

fn parse_board_row(row: &[RawCell], number_idx: usize, board_number: u32) -> Option<BoardPairing> {
    let (result_idx, decoded) = row
        .iter()
        .enumerate()
        .skip(number_idx + 1)
        .find_map(|(i, c)| {
            let text = clean_cell(c);
            // Only explicit colon tokens qualify; an empty cell would
            // otherwise decode as an unplayed board.
            if text.contains(':') {
                decode_board_result(&text).map(|b| (i, b))
            } else {
                None
            }
        })?;

    let white = parse_player_side(&row[number_idx + 1..result_idx]);
    let black = parse_player_side(row.get(result_idx + 1..).unwrap_or(&[]));

    Some(BoardPairing {
        board_number,
        white_player: white.name,
        black_player: black.name,
        white_rating: white.rating,
        black_rating: black.rating,
        white_title: white.title,
        black_title: black.title,
        result: decoded.result,
        white_score: decoded.white_score,
        black_score: decoded.black_score,
        white_result: decoded.white_result,
        black_result: decoded.black_result,
    })
}

#[derive(Default)]
struct PlayerSide {
    title: Option<String>,
    name: Option<String>,
    rating: Option<u32>,
}

/// One side of a board row: an optional title token, name cells (joined),
/// and a rating-range integer, in whatever cell order the export used.
fn parse_player_side(cells: &[RawCell]) -> PlayerSide {
    let mut side = PlayerSide::default();
    let mut name_parts: Vec<String> = Vec::new();
    for cell in cells {
        if let Some(n) = parse_int_or_none(cell) {
            if (RATING_MIN..=RATING_MAX).contains(&n) && side.rating.is_none() {
                side.rating = Some(n as u32);
            }
            continue;
        }
        let text = clean_cell(cell);
        if text.is_empty() {
            continue;
        }
        let upper = text.to_uppercase();
        if TITLE_TOKENS.contains(&upper.as_str()) {
            if side.title.is_none() {
                side.title = Some(upper);
            }
            continue;
        }
        name_parts.push(text);
    }
    if !name_parts.is_empty() {
        side.name = Some(name_parts.join(" "));
    }
    side
}

/// Forfeit is inferred once boards are attached: one side at zero plus a
/// board with a missing player.
fn finalize(mut pairing: TeamPairing) -> TeamPairing {
    let zero_side = pairing.white_score == Some(0.0) || pairing.black_score == Some(0.0);
    let missing_player = pairing
        .boards
        .iter()
        .any(|b| b.white_player.is_none() || b.black_player.is_none());
    if zero_side && missing_player {
        pairing.is_forfeit = true;
    }
    pairing
}

fn first_non_empty(row: &[RawCell]) -> Option<(usize, String)> {
    row.iter().enumerate().find_map(|(i, c)| {
        let text = clean_cell(c);
        if text.is_empty() { None } else { Some((i, text)) }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use crate::enums::SideResult;

    fn grid_of(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|s| {
                            if s.is_empty() {
                                RawCell::Empty
                            } else {
                                RawCell::Text((*s).to_owned())
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    fn sample_round_grid() -> Grid {
        grid_of(&[
            &["Club Team Championship"],
            &["Team Pairings of Round 7"],
            &["No.", "Team", "Res.", "Team"],
            &["3.1", "2", "Kings SC", "4½ : 1½", "Pawns United", "5"],
            &["1", "GM", "Smith, John", "2450", "1:0", "2380", "IM", "Doe, Jane"],
            &["2", "", "Able, Mark", "2300", "½:½", "2290", "", "Baker, Ann"],
            &["3", "", "Cole, Rita", "2250", "1:0", "2240", "", "Dunn, Ben"],
            &["4", "", "Egan, Sam", "2200", "1:0", "2190", "", "Ford, Kim"],
            &["5", "", "Gray, Lee", "2150", "½:½", "2140", "", "Hart, Joy"],
            &["6", "", "Ives, Pat", "2100", "½:½", "2090", "", "Jobe, Max"],
            &["3.2", "3", "Rooks United", "3:3", "Bishops Club", "4"],
            &["1", "", "Kent, Ada", "2050", "½:½", "2040", "", "Lane, Eli"],
            &["2", "", "Moss, Ivy", "2000", "½:½", "1990", "", "Nash, Ole"],
            &["3", "", "Otis, Una", "1950", "1:0", "1940", "", "Page, Vic"],
            &["4", "", "Quin, Wes", "1900", "0:1", "1890", "", "Rush, Xia"],
            &["5", "", "Sato, Yul", "1850", "½:½", "1840", "", "Teal, Zoe"],
            &["6", "", "Uden, Ari", "1800", "½:½", "1790", "", "Vale, Bea"],
            &["exported by swiss-manager"],
        ])
    }

    /// Full round report: two pairings, six boards each, board rows attached
    /// to the pairing most recently started.
    #[test]
    fn full_team_round_end_to_end() {
        let data = parse_team_round(&sample_round_grid(), "teams.xlsx");

        assert_eq!(
            data.tournament_metadata.base.name.as_deref(),
            Some("Club Team Championship")
        );
        // Round hint comes from the marker line here.
        assert_eq!(data.tournament_metadata.round, Some(7));
        assert_eq!(data.team_pairings.len(), 2);

        let first = &data.team_pairings[0];
        assert_eq!(first.pairing_number, "3.1");
        assert_eq!(first.white_team, "Kings SC");
        assert_eq!(first.black_team, "Pawns United");
        assert_eq!(first.white_rank, Some(2));
        assert_eq!(first.black_rank, Some(5));
        assert_eq!(first.white_score, Some(4.5));
        assert_eq!(first.black_score, Some(1.5));
        assert!(!first.is_forfeit);
        assert_eq!(first.boards.len(), 6);

        let board1 = &first.boards[0];
        assert_eq!(board1.board_number, 1);
        assert_eq!(board1.white_player.as_deref(), Some("Smith, John"));
        assert_eq!(board1.white_title.as_deref(), Some("GM"));
        assert_eq!(board1.white_rating, Some(2450));
        assert_eq!(board1.black_player.as_deref(), Some("Doe, Jane"));
        assert_eq!(board1.black_title.as_deref(), Some("IM"));
        assert_eq!(board1.black_rating, Some(2380));
        assert_eq!(board1.result, "1:0");
        assert_eq!(board1.white_result, SideResult::Win);

        let second = &data.team_pairings[1];
        assert_eq!(second.pairing_number, "3.2");
        assert_eq!(second.boards.len(), 6);
        assert_eq!(second.boards[3].result, "0:1");
        assert_eq!(second.boards[3].black_result, SideResult::Win);
    }

    /// Board sums of the sample grid match the declared aggregates, so the
    /// validator stays quiet on real output.
    #[test]
    fn sample_round_passes_validation() {
        let data = parse_team_round(&sample_round_grid(), "teams.xlsx");
        assert!(crate::validation::validate_team_round(&data).is_empty());
    }

    /// A `round7` filename hint fills the round when the sheet itself lacks
    /// one.
    #[test]
    fn filename_round_hint() {
        let grid = grid_of(&[
            &["Club Team Championship"],
            &["Team Pairings"],
            &["No.", "Team", "Res.", "Team"],
            &["1", "Kings SC", "3:3", "Pawns United"],
        ]);
        let data = parse_team_round(&grid, "teams_round7.xlsx");
        assert_eq!(data.tournament_metadata.round, Some(7));

        let data = parse_team_round(&grid, "R3.xlsx");
        assert_eq!(data.tournament_metadata.round, Some(3));

        let data = parse_team_round(&grid, "teams.xlsx");
        assert_eq!(data.tournament_metadata.round, None);
    }

    /// One side at zero plus forfeited boards marks the pairing as a
    /// forfeit.
    #[test]
    fn forfeit_inferred_from_zero_score_and_missing_players() {
        let grid = grid_of(&[
            &["Team Pairings of Round 2"],
            &["No.", "Team", "Res.", "Team"],
            &["1.1", "Kings SC", "6:0", "Ghost Team"],
            &["1", "", "Smith, John", "2450", "+:-", "", "", ""],
            &["2", "", "Able, Mark", "2300", "+:-", "", "", ""],
            &["3", "", "Cole, Rita", "2250", "+:-", "", "", ""],
            &["4", "", "Egan, Sam", "2200", "+:-", "", "", ""],
            &["5", "", "Gray, Lee", "2150", "+:-", "", "", ""],
            &["6", "", "Ives, Pat", "2100", "+:-", "", "", ""],
        ]);
        let data = parse_team_round(&grid, "teams.xlsx");
        assert_eq!(data.team_pairings.len(), 1);
        let pairing = &data.team_pairings[0];
        assert!(pairing.is_forfeit);
        assert_eq!(pairing.boards.len(), 6);
        assert_eq!(pairing.boards[0].white_result, SideResult::Win);
        assert_eq!(pairing.boards[0].black_result, SideResult::Forfeit);
        assert_eq!(pairing.boards[0].black_player, None);
    }

    /// No header row: metadata-only result, never an error.
    #[test]
    fn missing_header_yields_metadata_only() {
        let grid = grid_of(&[&["Club Team Championship"], &["nothing", "tabular", "here"]]);
        let data = parse_team_round(&grid, "teams.xlsx");
        assert_eq!(
            data.tournament_metadata.base.name.as_deref(),
            Some("Club Team Championship")
        );
        assert!(data.team_pairings.is_empty());
    }

    /// Board rows before any pairing row have no cursor to attach to and are
    /// dropped.
    #[test]
    fn orphan_board_rows_are_skipped() {
        let grid = grid_of(&[
            &["Team Pairings of Round 1"],
            &["No.", "Team", "Res.", "Team"],
            &["1", "", "Smith, John", "2450", "1:0", "2380", "", "Doe, Jane"],
            &["2.1", "Kings SC", "3:3", "Pawns United"],
        ]);
        let data = parse_team_round(&grid, "teams.xlsx");
        assert_eq!(data.team_pairings.len(), 1);
        assert!(data.team_pairings[0].boards.is_empty());
    }

    /// An unplayed board decodes to the forfeited `-:-` shape inside the
    /// pairing.
    #[test]
    fn unplayed_board_row() {
        let grid = grid_of(&[
            &["Team Pairings of Round 1"],
            &["No.", "Team", "Res.", "Team"],
            &["1.1", "Kings SC", "3½:2½", "Pawns United"],
            &["1", "", "Smith, John", "2450", "-:-", "2380", "", "Doe, Jane"],
        ]);
        let data = parse_team_round(&grid, "teams.xlsx");
        let board = &data.team_pairings[0].boards[0];
        assert_eq!(board.result, "-:-");
        assert_eq!((board.white_score, board.black_score), (0.0, 0.0));
        assert_eq!(board.white_result, SideResult::Forfeit);
        assert_eq!(board.black_result, SideResult::Forfeit);
    }
}
