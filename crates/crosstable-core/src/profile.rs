//! Format profiles: the small value objects that parameterize the shared
//! parsing pipeline for each spreadsheet dialect.
//!
//! The four export formats share one control flow and differ only in marker
//! phrases, required header columns, round-column interpretation, and footer
//! signatures. A profile captures exactly that variation; there is no
//! inheritance and no per-format parser class.

use regex::Regex;

use crate::columns::{FED_HEADER_RE, NAME_HEADER_RE, RANK_HEADER_RE, TEAM_HEADER_RE};
use crate::enums::TournamentFormat;

/// How columns after the scalar roles encode per-round results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundColumnMode {
    /// Swiss exports: a `N.Rd` header starts a 3-column
    /// (opponent, color, result) group, often collapsed into one cell.
    SwissTriples,
    /// Round-robin cross-tables: a purely numeric header is a reference to
    /// the opponent with that rank, one column per opposing rank.
    OpponentRank,
}

/// Which header columns must be present for a row to qualify as the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredHeaders {
    /// Rank, name, and federation: the Swiss individual layouts.
    RankNameFederation,
    /// Rank and name only: cross-tables often omit federations.
    RankName,
    /// A number column and a team column: the team round report.
    NumberTeam,
}

impl RequiredHeaders {
    /// The compiled patterns a candidate header row must all satisfy.
    pub fn patterns(self) -> Vec<&'static Regex> {
        match self {
            Self::RankNameFederation => {
                vec![&*RANK_HEADER_RE, &*NAME_HEADER_RE, &*FED_HEADER_RE]
            }
            Self::RankName => vec![&*RANK_HEADER_RE, &*NAME_HEADER_RE],
            Self::NumberTeam => vec![&*RANK_HEADER_RE, &*TEAM_HEADER_RE],
        }
    }
}

/// Everything format-specific the shared pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProfile {
    pub format: TournamentFormat,
    pub round_mode: RoundColumnMode,
    pub required_headers: RequiredHeaders,
    /// Phrases any of which marks the ranking/standings section.
    pub section_phrases: &'static [&'static str],
    /// Substrings that mark the export footer and end row extraction.
    pub footer_signatures: &'static [&'static str],
    /// Rows searched for the header below the section marker.
    pub header_window: usize,
    /// Preamble rows scanned for metadata when no marker is found.
    pub metadata_row_budget: usize,
    /// Whether unlabeled trailing numeric columns are classified as
    /// tie-breaks by value heuristics (the legacy format has no trustworthy
    /// tie-break headers).
    pub heuristic_tie_breaks: bool,
}

const RANKING_PHRASES: &[&str] = &[
    "final ranking",
    "final standing",
    "ranking crosstable",
    "rank after round",
    "crosstable",
];

const TEAM_PHRASES: &[&str] = &["team pairings", "pairings of round", "team composition"];

const FOOTER_SIGNATURES: &[&str] = &[
    "chess-results",
    "swiss-manager",
    "swiss manager",
    "program",
];

impl FormatProfile {
    /// Legacy Swiss individual export (chess-results style). Tie-breaks are
    /// unlabeled trailing columns classified by value heuristics.
    pub fn swiss() -> Self {
        Self {
            format: TournamentFormat::Swiss,
            round_mode: RoundColumnMode::SwissTriples,
            required_headers: RequiredHeaders::RankNameFederation,
            section_phrases: RANKING_PHRASES,
            footer_signatures: FOOTER_SIGNATURES,
            header_window: 6,
            metadata_row_budget: 30,
            heuristic_tie_breaks: true,
        }
    }

    /// Enhanced Swiss-Manager individual export with labeled tie-break
    /// columns (`TB1`.., `BH`, `SB`, ...).
    pub fn swiss_manager() -> Self {
        Self {
            format: TournamentFormat::SwissManager,
            heuristic_tie_breaks: false,
            ..Self::swiss()
        }
    }

    /// Round-robin individual cross-table: numeric headers reference
    /// opponents by rank.
    pub fn round_robin() -> Self {
        Self {
            format: TournamentFormat::RoundRobin,
            round_mode: RoundColumnMode::OpponentRank,
            required_headers: RequiredHeaders::RankName,
            section_phrases: RANKING_PHRASES,
            footer_signatures: FOOTER_SIGNATURES,
            header_window: 6,
            metadata_row_budget: 30,
            heuristic_tie_breaks: false,
        }
    }

    /// Team/board-match round report.
    pub fn team_round() -> Self {
        Self {
            format: TournamentFormat::TeamRound,
            round_mode: RoundColumnMode::SwissTriples,
            required_headers: RequiredHeaders::NumberTeam,
            section_phrases: TEAM_PHRASES,
            footer_signatures: FOOTER_SIGNATURES,
            header_window: 8,
            metadata_row_budget: 30,
            heuristic_tie_breaks: false,
        }
    }
}
