//! Closed vocabularies shared across the engine: piece colors, game results,
//! board-side result tags, tie-break classifications, and format tags.

use serde::{Deserialize, Serialize};

/// The color a player had in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

/// The normalized outcome of one round from the row player's perspective.
///
/// `Bye` is a round with no assigned opponent; it is a distinct outcome, not
/// a decoded win/loss/draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Draw,
    Loss,
    Bye,
}

/// Per-side result tag of one board within a team match.
///
/// `Forfeit` marks a board awarded without play (missing player); the side's
/// score is recorded separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideResult {
    Win,
    Draw,
    Loss,
    Forfeit,
}

/// Heuristic classification of an unlabeled numeric tie-break column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieBreakKind {
    /// Value in {0, 0.5, 1}: a direct-encounter score.
    DirectEncounter,
    /// A small integer: number of games won.
    NumberOfWins,
    /// The row's highest rating-range value.
    PerformanceRating,
    /// The row's second-highest rating-range value.
    AverageRatingOfOpponents,
    /// A rating-range value that is neither the highest nor second-highest;
    /// performance or ARO, ambiguous by construction.
    PerformanceAroCandidate,
    /// A fractional value with at least one fractional sibling column.
    BuchholzSonneborn,
    /// The only fractional value in its row.
    BuchholzGamepoints,
    /// Nothing matched; the value is kept under this label for inspection.
    Unclassified,
}

impl TieBreakKind {
    /// Human-readable slot label used as the key in a player's tie-break map.
    pub fn label(self) -> &'static str {
        match self {
            Self::DirectEncounter => "Direct Encounter",
            Self::NumberOfWins => "Number of Wins",
            Self::PerformanceRating => "Performance Rating",
            Self::AverageRatingOfOpponents => "Average Rating of Opponents",
            Self::PerformanceAroCandidate => "Performance/ARO Candidate",
            Self::BuchholzSonneborn => "Buchholz / Sonneborn-Berger",
            Self::BuchholzGamepoints => "Buchholz (Gamepoints)",
            Self::Unclassified => "Unclassified",
        }
    }
}

/// The spreadsheet dialect a parse call was asked to use.
///
/// The engine never auto-detects; the caller selects the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Legacy Swiss individual export (chess-results style).
    Swiss,
    /// Enhanced Swiss-Manager individual export with labeled tie-breaks.
    SwissManager,
    /// Round-robin individual cross-table.
    RoundRobin,
    /// Team/board-match round report.
    TeamRound,
}
