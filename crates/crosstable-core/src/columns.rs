//! Column classifier: maps header-row cell text to semantic column roles.
//!
//! One pass over the header cells. Scalar roles (rank, name, federation,
//! rating, points) follow a first-occurrence policy: once a role is assigned,
//! later cells matching the same role are ignored. Round and tie-break
//! columns accumulate in column order.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::cell::{RawCell, clean_cell};
use crate::patterns::compile_literal;
use crate::profile::{FormatProfile, RoundColumnMode};

pub(crate) static RANK_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"^(rk\.?|rank|nr\.?|no\.?|pos\.?|#|snr\.?|sno\.?)$"));
pub(crate) static NAME_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"(name|player|spieler)"));
pub(crate) static FED_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"^(fed\.?|land|country)"));
pub(crate) static TEAM_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"(team|mannschaft)"));
static RATING_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"^(rtg[in]?\.?|rating|elo)$"));
static TITLE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"^(title|tit\.?)$"));
static CLUB_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"^(club(/city)?|city|verein)$"));
static POINTS_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"^(pts\.?|pkt\.?|points|punkte|score)$"));

// "1.Rd", "Rd 1", "R1", "Round 1".
static ROUND_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_literal(r"^(?:(\d+)\s*\.\s*rd\.?|r(?:ound|d)?\s*\.?\s*(\d+))$"));
static NUMERIC_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"^\d+$"));
static TB_SLOT_RE: LazyLock<Regex> = LazyLock::new(|| compile_literal(r"^tb\s*(\d)\.?$"));

/// Start of a 3-column (opponent, color, result) group for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundGroup {
    pub round: u32,
    pub start_col: usize,
}

/// A cross-table column holding results against the opponent ranked
/// `opponent_rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentColumn {
    pub col: usize,
    pub opponent_rank: u32,
}

/// A labeled tie-break column mapped to a stable slot name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieBreakColumn {
    pub col: usize,
    pub slot: String,
}

/// Semantic roles of a header row's columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    pub rank: Option<usize>,
    pub name: Option<usize>,
    pub federation: Option<usize>,
    pub title: Option<usize>,
    pub club: Option<usize>,
    pub rating: Option<usize>,
    pub points: Option<usize>,
    pub round_groups: Vec<RoundGroup>,
    pub opponent_columns: Vec<OpponentColumn>,
    pub tie_break_columns: Vec<TieBreakColumn>,
}

impl ColumnMap {
    /// Every column index already claimed by some role. Used by the row
    /// walker to find unlabeled trailing tie-break columns.
    pub fn claimed_columns(&self) -> Vec<usize> {
        let mut cols = Vec::new();
        for role in [
            self.rank,
            self.name,
            self.federation,
            self.title,
            self.club,
            self.rating,
            self.points,
        ]
        .into_iter()
        .flatten()
        {
            cols.push(role);
        }
        cols.extend(self.round_groups.iter().map(|g| g.start_col));
        cols.extend(self.opponent_columns.iter().map(|o| o.col));
        cols.extend(self.tie_break_columns.iter().map(|t| t.col));
        cols
    }
}

/// Classifies one header row under the given format profile.
pub fn classify_headers(header: &[RawCell], profile: &FormatProfile) -> ColumnMap {
    let mut map = ColumnMap::default();

    for (col, cell) in header.iter().enumerate() {
        let text = clean_cell(cell).to_lowercase();
        if text.is_empty() {
            continue;
        }

        if let Some(round) = match_round_header(&text) {
            match profile.round_mode {
                RoundColumnMode::SwissTriples => {
                    map.round_groups.push(RoundGroup {
                        round,
                        start_col: col,
                    });
                    continue;
                }
                RoundColumnMode::OpponentRank => {
                    // A round-robin sheet can still carry "Rd"-style headers
                    // for a schedule block; those are not opponent columns
                    // and are left unclassified.
                    trace!(col, header = %text, "round-style header ignored in cross-table mode");
                    continue;
                }
            }
        }

        if NUMERIC_HEADER_RE.is_match(&text) {
            match profile.round_mode {
                // Format-dependent reinterpretation: in a round-robin
                // cross-table a purely numeric header is an opponent-rank
                // reference column (one column per opposing rank), not a
                // round number. This branch is deliberate, not a fallthrough.
                RoundColumnMode::OpponentRank => {
                    if let Ok(rank) = text.parse::<u32>() {
                        map.opponent_columns.push(OpponentColumn {
                            col,
                            opponent_rank: rank,
                        });
                    }
                    continue;
                }
                RoundColumnMode::SwissTriples => {
                    trace!(col, header = %text, "numeric header ignored in swiss mode");
                    continue;
                }
            }
        }

        if let Some(slot) = match_tie_break_header(&text) {
            map.tie_break_columns.push(TieBreakColumn { col, slot });
            continue;
        }

        assign_scalar_role(&mut map, col, &text);
    }

    debug!(
        rank = ?map.rank,
        name = ?map.name,
        federation = ?map.federation,
        title = ?map.title,
        club = ?map.club,
        rating = ?map.rating,
        points = ?map.points,
        rounds = map.round_groups.len(),
        opponent_columns = map.opponent_columns.len(),
        tie_breaks = map.tie_break_columns.len(),
        "header classified"
    );
    map
}

fn match_round_header(text: &str) -> Option<u32> {
    let caps = ROUND_HEADER_RE.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// Maps tie-break header aliases to stable slot names.
fn match_tie_break_header(text: &str) -> Option<String> {
    if let Some(caps) = TB_SLOT_RE.captures(text) {
        return caps.get(1).map(|n| format!("TB{}", n.as_str()));
    }
    // Order matters: "bh:gp" must win over the plain Buchholz prefix.
    if text == "bh:gp" || text.contains("gamepoint") {
        return Some("BH-GP".to_owned());
    }
    if text == "sb" || text.contains("sonneborn") {
        return Some("SB".to_owned());
    }
    if text.starts_with("bh") || text.contains("buchholz") {
        return Some("BH".to_owned());
    }
    if text == "de" || text == "res" || text == "res." || text.contains("direct") {
        return Some("DE".to_owned());
    }
    if text == "aro" {
        return Some("ARO".to_owned());
    }
    if text == "ratp" || text == "rp" || text.contains("perf") {
        return Some("PERF".to_owned());
    }
    if text == "win" || text == "wins" || text == "win/p" || text == "w/p" {
        return Some("WINS".to_owned());
    }
    None
}

/// First-occurrence policy: a role is assigned once and later matches for the
/// same role are ignored.
fn assign_scalar_role(map: &mut ColumnMap, col: usize, text: &str) {
    if map.rank.is_none() && RANK_HEADER_RE.is_match(text) {
        map.rank = Some(col);
    } else if map.name.is_none()
        && (NAME_HEADER_RE.is_match(text) || TEAM_HEADER_RE.is_match(text))
    {
        map.name = Some(col);
    } else if map.federation.is_none() && FED_HEADER_RE.is_match(text) {
        map.federation = Some(col);
    } else if map.title.is_none() && TITLE_HEADER_RE.is_match(text) {
        map.title = Some(col);
    } else if map.club.is_none() && CLUB_HEADER_RE.is_match(text) {
        map.club = Some(col);
    } else if map.rating.is_none() && RATING_HEADER_RE.is_match(text) {
        map.rating = Some(col);
    } else if map.points.is_none() && POINTS_HEADER_RE.is_match(text) {
        map.points = Some(col);
    }
}
