//! Cross-check diagnostics over already-parsed tournament data.
//!
//! Every finding is a warning alongside the returned data: a failed
//! cross-check never alters the parse result and never blocks output. The
//! caller (a CLI, an upload handler) decides what to show a human.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::structures::{PlayerRanking, TeamPairing, TeamRoundData};

/// Severity of a diagnostic finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The parse result contradicts itself; still returned as-is.
    Warning,
    /// An observation worth surfacing, not a contradiction.
    Info,
}

/// Machine-readable identifier for a cross-check rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RuleId {
    /// TEAM-SUM-01: a team's declared aggregate score must equal the sum of
    /// its board-level scores.
    TeamSum01,
    /// TEAM-BOARDS-01: a team match has a board count outside the plausible
    /// range.
    TeamBoards01,
    /// RR-DUP-RANK-01: two cross-table players share a rank, making opponent
    /// resolution by rank ambiguous.
    RrDupRank01,
}

impl RuleId {
    /// Canonical hyphenated rule code used in serialized output.
    pub fn code(self) -> &'static str {
        match self {
            Self::TeamSum01 => "TEAM-SUM-01",
            Self::TeamBoards01 => "TEAM-BOARDS-01",
            Self::RrDupRank01 => "RR-DUP-RANK-01",
        }
    }
}

/// One cross-check finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub rule: RuleId,
    pub message: String,
    /// Where in the parsed data the finding applies, e.g. a pairing number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "[{}] {}: {}", self.rule.code(), loc, self.message),
            None => write!(f, "[{}] {}", self.rule.code(), self.message),
        }
    }
}

const MIN_PLAUSIBLE_BOARDS: usize = 3;
const MAX_PLAUSIBLE_BOARDS: usize = 8;
const SCORE_TOLERANCE: f64 = 1e-9;

/// Cross-checks every pairing of a parsed team round.
///
/// Warns on board counts outside [3, 8] and on declared aggregate scores
/// that disagree with the sum of board scores. The data itself is never
/// modified.
pub fn validate_team_round(data: &TeamRoundData) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for pairing in &data.team_pairings {
        check_board_count(pairing, &mut diagnostics);
        check_score_sums(pairing, &mut diagnostics);
    }
    for d in &diagnostics {
        warn!(rule = d.rule.code(), location = ?d.location, "{}", d.message);
    }
    diagnostics
}

fn check_board_count(pairing: &TeamPairing, out: &mut Vec<Diagnostic>) {
    let count = pairing.boards.len();
    if !(MIN_PLAUSIBLE_BOARDS..=MAX_PLAUSIBLE_BOARDS).contains(&count) {
        out.push(Diagnostic {
            severity: Severity::Warning,
            rule: RuleId::TeamBoards01,
            message: format!(
                "{count} boards parsed; expected between {MIN_PLAUSIBLE_BOARDS} and {MAX_PLAUSIBLE_BOARDS}"
            ),
            location: Some(format!("pairing {}", pairing.pairing_number)),
        });
    }
}

fn check_score_sums(pairing: &TeamPairing, out: &mut Vec<Diagnostic>) {
    let board_white: f64 = pairing.boards.iter().map(|b| b.white_score).sum();
    let board_black: f64 = pairing.boards.iter().map(|b| b.black_score).sum();

    if let Some(declared) = pairing.white_score {
        if (declared - board_white).abs() > SCORE_TOLERANCE {
            out.push(score_mismatch(pairing, "white", declared, board_white));
        }
    }
    if let Some(declared) = pairing.black_score {
        if (declared - board_black).abs() > SCORE_TOLERANCE {
            out.push(score_mismatch(pairing, "black", declared, board_black));
        }
    }
}

fn score_mismatch(pairing: &TeamPairing, side: &str, declared: f64, boards: f64) -> Diagnostic {
    Diagnostic {
        severity: Severity::Warning,
        rule: RuleId::TeamSum01,
        message: format!(
            "declared {side} score {declared} does not equal board sum {boards}"
        ),
        location: Some(format!("pairing {}", pairing.pairing_number)),
    }
}

/// Flags duplicate ranks in a parsed standings list.
///
/// Cross-table opponent resolution assumes ranks are unique; when two
/// players share one, resolution takes the first in standings order and this
/// diagnostic surfaces the ambiguity.
pub fn check_duplicate_ranks(players: &[PlayerRanking]) -> Vec<Diagnostic> {
    let mut seen = std::collections::HashSet::new();
    let mut flagged = std::collections::HashSet::new();
    let mut diagnostics = Vec::new();
    for player in players {
        if !seen.insert(player.rank) && flagged.insert(player.rank) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                rule: RuleId::RrDupRank01,
                message: format!(
                    "rank {} appears more than once; opponent resolution uses the first occurrence",
                    player.rank
                ),
                location: None,
            });
        }
    }
    for d in &diagnostics {
        warn!(rule = d.rule.code(), "{}", d.message);
    }
    diagnostics
}
