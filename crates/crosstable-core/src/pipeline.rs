//! Shared parsing pipeline for the individual-format strategies.
//!
//! All individual formats (legacy Swiss, Swiss-Manager, round-robin) run the
//! same state machine, parameterized by a [`FormatProfile`]:
//!
//! `ScanningMetadata → LocatingSection → LocatingHeader → ExtractingRows →
//! Done`, with a no-header terminal that still yields a metadata-only result.
//!
//! Nothing in here returns an error: structural failures degrade to partial
//! output and every decision is traced for post-mortem inspection of
//! malformed sheets.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::cell::{Grid, RawCell, clean_cell, parse_decimal_or_none, parse_int_or_none};
use crate::columns::{ColumnMap, classify_headers};
use crate::locate::{find_header_row, find_header_row_from, find_section_marker, is_footer_row};
use crate::metadata::extract_metadata;
use crate::profile::{FormatProfile, RoundColumnMode};
use crate::structures::{PlayerRanking, RoundResult, TournamentData, TournamentMetadata};
use crate::tiebreak;
use crate::tokens::{decode_crosstable_cell, decode_swiss_round_token};
use crate::validation::check_duplicate_ranks;

/// Parses one individual-format sheet into a tournament record.
///
/// Never fails: when no header row can be located the result carries the
/// extracted metadata and an empty ranking list.
pub fn parse_individual(grid: &Grid, profile: &FormatProfile, source: &str) -> TournamentData {
    debug!(format = ?profile.format, source, rows = grid.row_count(), "parse start");

    let marker = find_section_marker(grid, profile.section_phrases);
    let metadata_stop = marker.unwrap_or(profile.metadata_row_budget);
    let mut metadata = extract_metadata(grid, metadata_stop, source);

    let patterns = profile.required_headers.patterns();
    let header_row = match marker {
        Some(m) => find_header_row(grid, m, &patterns, profile.header_window),
        // No marker phrase matched; fall back to searching the whole sheet
        // so that bare grids without a preamble still parse.
        None => find_header_row_from(grid, 0, &patterns, grid.row_count()),
    };

    let Some(header_idx) = header_row else {
        warn!(source, "no header row found; returning metadata-only result");
        return TournamentData {
            tournament_metadata: metadata,
            player_rankings: Vec::new(),
        };
    };

    let columns = classify_headers(grid.row(header_idx).unwrap_or(&[]), profile);
    let mut players = extract_players(grid, profile, header_idx, &columns);

    if profile.round_mode == RoundColumnMode::OpponentRank {
        resolve_crosstable_rounds(grid, header_idx, &columns, &mut players, profile);
    }

    if metadata.rounds.is_none() {
        backfill_round_count(&mut metadata, &players);
    }

    debug!(players = players.len(), "parse done");
    TournamentData {
        tournament_metadata: metadata,
        player_rankings: players,
    }
}

/// Walks data rows below the header until the sheet ends or a footer row is
/// seen. Rows without a parseable rank are skipped, not fatal.
fn extract_players(
    grid: &Grid,
    profile: &FormatProfile,
    header_idx: usize,
    columns: &ColumnMap,
) -> Vec<PlayerRanking> {
    let mut players = Vec::new();
    let Some(rank_col) = columns.rank else {
        warn!("header classified without a rank column; no rows extracted");
        return players;
    };

    for row_idx in (header_idx + 1)..grid.row_count() {
        if is_footer_row(grid, row_idx, profile.footer_signatures) {
            debug!(row = row_idx, "footer reached; extraction stops");
            break;
        }
        let Some(row) = grid.row(row_idx) else {
            break;
        };

        let rank = parse_int_or_none(grid.cell(row_idx, rank_col))
            .filter(|r| *r > 0)
            .map(|r| r as u32);
        let Some(rank) = rank else {
            trace!(row = row_idx, "row without parseable rank skipped");
            continue;
        };

        let mut player = PlayerRanking::with_rank(rank);
        player.name = columns.name.and_then(|c| non_empty(grid.cell(row_idx, c)));
        player.federation = columns
            .federation
            .and_then(|c| non_empty(grid.cell(row_idx, c)));
        player.title = columns.title.and_then(|c| non_empty(grid.cell(row_idx, c)));
        player.club = columns.club.and_then(|c| non_empty(grid.cell(row_idx, c)));
        player.rating = columns
            .rating
            .and_then(|c| parse_int_or_none(grid.cell(row_idx, c)))
            .filter(|r| *r > 0)
            .map(|r| r as u32);
        player.points = columns
            .points
            .and_then(|c| parse_decimal_or_none(grid.cell(row_idx, c)));

        if profile.round_mode == RoundColumnMode::SwissTriples {
            extract_swiss_rounds(row, columns, &mut player);
        }

        extract_labeled_tie_breaks(row, columns, &mut player);
        if profile.heuristic_tie_breaks {
            extract_heuristic_tie_breaks(row, columns, &mut player);
        }

        trace!(
            row = row_idx,
            rank = player.rank,
            name = ?player.name,
            points = ?player.points,
            rounds = player.rounds.len(),
            tie_breaks = player.tie_breaks.len(),
            "player extracted"
        );
        players.push(player);
    }
    players
}

/// Decodes the per-round 3-column groups of a Swiss row.
///
/// Exports often collapse the (opponent, color, result) triple into one cell
/// ("12w1"); joining the group's cells first handles both layouts. An
/// undecodable non-empty token is still recorded with its raw text so the
/// row stays auditable.
fn extract_swiss_rounds(row: &[RawCell], columns: &ColumnMap, player: &mut PlayerRanking) {
    let mut groups = columns.round_groups.clone();
    groups.sort_by_key(|g| g.start_col);

    // Columns claimed by anything that is not a round group bound the span
    // a group may join across.
    let mut other_claimed: Vec<usize> = columns
        .claimed_columns()
        .into_iter()
        .filter(|c| !groups.iter().any(|g| g.start_col == *c))
        .collect();
    other_claimed.sort_unstable();

    for (i, group) in groups.iter().enumerate() {
        let hard_end = row.len();
        let next_group = groups.get(i + 1).map_or(hard_end, |g| g.start_col);
        let next_claimed = other_claimed
            .iter()
            .copied()
            .find(|c| *c > group.start_col)
            .unwrap_or(hard_end);
        let end = (group.start_col + 3).min(next_group).min(next_claimed).min(hard_end);

        let token: String = (group.start_col..end)
            .map(|c| clean_cell(row.get(c).unwrap_or(&RawCell::Empty)))
            .collect::<Vec<_>>()
            .join("");
        if token.is_empty() {
            continue;
        }

        match decode_swiss_round_token(&token) {
            Some(round) => player.rounds.push(round),
            None => {
                trace!(round = group.round, token = %token, "undecodable round token kept raw");
                player
                    .rounds
                    .push(RoundResult::game(None, None, None, &token));
            }
        }
    }
}

fn extract_labeled_tie_breaks(row: &[RawCell], columns: &ColumnMap, player: &mut PlayerRanking) {
    for tb in &columns.tie_break_columns {
        let value = row.get(tb.col).and_then(parse_decimal_or_none);
        insert_tie_break(&mut player.tie_breaks, &tb.slot, value);
    }
}

/// Legacy format: trailing numeric columns carry no usable headers and are
/// classified by value heuristics against the whole row.
fn extract_heuristic_tie_breaks(row: &[RawCell], columns: &ColumnMap, player: &mut PlayerRanking) {
    let claimed = claimed_spans(columns);
    let mut candidates: Vec<Option<f64>> = Vec::new();
    let mut cols: Vec<usize> = Vec::new();

    for (col, cell) in row.iter().enumerate() {
        if claimed.contains(&col) || clean_cell(cell).is_empty() {
            continue;
        }
        cols.push(col);
        candidates.push(parse_decimal_or_none(cell));
    }

    for (idx, col) in cols.iter().enumerate() {
        let kind = tiebreak::classify(candidates[idx], &candidates);
        trace!(col, kind = ?kind, value = ?candidates[idx], "heuristic tie-break");
        insert_tie_break(&mut player.tie_breaks, kind.label(), candidates[idx]);
    }
}

/// All columns a Swiss row's recognized fields occupy, with round groups
/// expanded to their full 3-column span.
fn claimed_spans(columns: &ColumnMap) -> Vec<usize> {
    let mut claimed = columns.claimed_columns();
    for group in &columns.round_groups {
        claimed.push(group.start_col + 1);
        claimed.push(group.start_col + 2);
    }
    claimed
}

/// Second pass of the cross-table strategy: with all players built, decode
/// each opponent-rank column against the full standings.
fn resolve_crosstable_rounds(
    grid: &Grid,
    header_idx: usize,
    columns: &ColumnMap,
    players: &mut [PlayerRanking],
    profile: &FormatProfile,
) {
    // Duplicate ranks make rank-based resolution ambiguous. The check warns
    // through the trace channel; callers that want the diagnostics list run
    // `check_duplicate_ranks` on the returned standings themselves.
    check_duplicate_ranks(players);

    let Some(rank_col) = columns.rank else {
        return;
    };

    // Re-walk the data rows to pair each player with their source row; the
    // extraction pass dropped rank-less rows, so match on rank.
    let mut row_of_rank: Vec<(u32, usize)> = Vec::new();
    for row_idx in (header_idx + 1)..grid.row_count() {
        if is_footer_row(grid, row_idx, profile.footer_signatures) {
            break;
        }
        if let Some(rank) = parse_int_or_none(grid.cell(row_idx, rank_col)) {
            if rank > 0 && !row_of_rank.iter().any(|(r, _)| *r == rank as u32) {
                row_of_rank.push((rank as u32, row_idx));
            }
        }
    }

    let snapshot: Vec<PlayerRanking> = players.to_vec();
    for (player_idx, player) in players.iter_mut().enumerate() {
        let Some(&(_, row_idx)) = row_of_rank.iter().find(|(r, _)| *r == player.rank) else {
            continue;
        };
        for opp in &columns.opponent_columns {
            let token = clean_cell(grid.cell(row_idx, opp.col));
            if let Some(round) =
                decode_crosstable_cell(&token, opp.opponent_rank, &snapshot, player_idx)
            {
                player.rounds.push(round);
            }
        }
        trace!(rank = player.rank, rounds = player.rounds.len(), "cross-table rounds resolved");
    }
}

/// When the preamble lacks a round count, the widest parsed rounds sequence
/// stands in for it.
fn backfill_round_count(metadata: &mut TournamentMetadata, players: &[PlayerRanking]) {
    let widest = players.iter().map(|p| p.rounds.len()).max().unwrap_or(0);
    if widest > 0 {
        metadata.rounds = Some(widest as u32);
        debug!(rounds = widest, "round count backfilled from parsed rows");
    }
}

fn non_empty(cell: &RawCell) -> Option<String> {
    let s = clean_cell(cell);
    if s.is_empty() { None } else { Some(s) }
}

/// Inserts under `base`, deduplicating keys with a numeric suffix so one
/// player's map never loses a slot.
fn insert_tie_break(map: &mut BTreeMap<String, Option<f64>>, base: &str, value: Option<f64>) {
    if !map.contains_key(base) {
        map.insert(base.to_owned(), value);
        return;
    }
    let mut n = 2usize;
    loop {
        let key = format!("{base} ({n})");
        if !map.contains_key(&key) {
            map.insert(key, value);
            return;
        }
        n += 1;
    }
}
