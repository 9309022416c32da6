//! The normalized tournament record: the common output shape shared by all
//! format-specific parser strategies.
//!
//! Ownership is strictly tree-shaped. One parse call produces one
//! [`TournamentData`] (or [`TeamRoundData`]) that exclusively owns its
//! metadata and its rankings or pairings; there is no sharing and no
//! back-reference, and nothing is mutated after return. All types serialize
//! losslessly to JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{Color, GameResult, SideResult};

/// Descriptive tournament header fields scraped from the sheet preamble.
///
/// Every field is optional except `source`, which is always the input
/// filename.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentMetadata {
    /// Tournament name, taken from the first unlabeled preamble row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_arbiter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deputy_chief_arbiter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_director: Option<String>,

    /// Arbiter other than the chief or deputy chief.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arbiter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_control: Option<String>,

    /// The parenthesized rate-of-play suffix of the time-control line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_of_play: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Number of rounds; backfilled from parsed rows when the preamble lacks it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_calculation: Option<String>,

    /// Start date in ISO `YYYY-MM-DD` form when recognizable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_age: Option<f64>,

    /// The input filename. Always set.
    pub source: String,
}

/// One decoded round for one player.
///
/// Two shapes share this struct:
/// - a bye: no opponent, no color, `result` = [`GameResult::Bye`];
/// - a game: opponent reference (pairing number or display name, depending on
///   format), optional color and result, and the original cell text in `raw`
///   for audit. `result` is `None` only when the original token could not be
///   decoded; the round is still recorded with `raw` preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub opponent: Option<String>,
    pub color: Option<Color>,
    pub result: Option<GameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RoundResult {
    /// A round with no assigned opponent.
    pub fn bye() -> Self {
        Self {
            opponent: None,
            color: None,
            result: Some(GameResult::Bye),
            raw: None,
        }
    }

    /// A played (or attempted-to-decode) game round.
    pub fn game(
        opponent: Option<String>,
        color: Option<Color>,
        result: Option<GameResult>,
        raw: &str,
    ) -> Self {
        Self {
            opponent,
            color,
            result,
            raw: Some(raw.to_owned()),
        }
    }
}

/// One row of the final standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRanking {
    /// Final rank. Rows without a parseable rank are dropped before this
    /// struct is ever built.
    pub rank: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<String>,

    /// FIDE-style title token (GM, IM, ...) when the sheet carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,

    /// Total points; half-points are representable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,

    /// Per-round results in column order, which is round order.
    pub rounds: Vec<RoundResult>,

    /// Tie-break slot name → value. Keys are unique within one player's map;
    /// the slot vocabulary depends on the parser strategy (labeled `TB1`..
    /// slots, or heuristic classification labels for the legacy format).
    pub tie_breaks: BTreeMap<String, Option<f64>>,
}

impl PlayerRanking {
    /// A ranking row holding only its rank; parsers fill in the rest.
    pub fn with_rank(rank: u32) -> Self {
        Self {
            rank,
            name: None,
            federation: None,
            title: None,
            club: None,
            rating: None,
            points: None,
            rounds: Vec::new(),
            tie_breaks: BTreeMap::new(),
        }
    }
}

/// One individual game within a team match, assigned to a numbered board.
///
/// A missing player name means the board was forfeited on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPairing {
    pub board_number: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_player: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_player: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_rating: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_rating: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_title: Option<String>,

    /// Canonical result string, e.g. `"1:0"`; `"-:-"` for an unplayed board.
    pub result: String,

    /// Per-side numeric score: 0, 0.5, or 1.
    pub white_score: f64,
    pub black_score: f64,

    pub white_result: SideResult,
    pub black_result: SideResult,
}

/// One team-vs-team match within a round, with its nested board results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPairing {
    /// Pairing number as printed, e.g. `"18.2"`.
    pub pairing_number: String,

    pub white_team: String,
    pub black_team: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_rank: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_rank: Option<u32>,

    /// Declared aggregate match scores, half-point granularity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_score: Option<f64>,

    /// Set when one side scored zero and a board shows a missing player.
    pub is_forfeit: bool,

    /// Board results in board-number order as encountered.
    pub boards: Vec<BoardPairing>,
}

/// Top-level output of the individual-format parsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentData {
    pub tournament_metadata: TournamentMetadata,
    pub player_rankings: Vec<PlayerRanking>,
}

/// Tournament metadata for a team round: the common header fields plus the
/// round number, which mostly arrives as a filename hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTournamentMetadata {
    #[serde(flatten)]
    pub base: TournamentMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

/// Top-level output of the team-round parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoundData {
    pub tournament_metadata: TeamTournamentMetadata,
    pub team_pairings: Vec<TeamPairing>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    /// A bye serializes with the null opponent/color shape and no `raw`.
    #[test]
    fn bye_round_serializes_with_null_opponent_and_color() {
        let json = serde_json::to_value(RoundResult::bye()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"opponent": null, "color": null, "result": "bye"})
        );
    }

    #[test]
    fn game_round_preserves_raw_token() {
        let round = RoundResult::game(
            Some("12".to_owned()),
            Some(Color::White),
            Some(GameResult::Win),
            "12w1",
        );
        let json = serde_json::to_value(&round).unwrap();
        assert_eq!(json["opponent"], "12");
        assert_eq!(json["color"], "white");
        assert_eq!(json["result"], "win");
        assert_eq!(json["raw"], "12w1");
    }

    /// Absent optional metadata fields are omitted from JSON; `source` is
    /// always present.
    #[test]
    fn metadata_omits_absent_fields() {
        let meta = TournamentMetadata {
            source: "open.xlsx".to_owned(),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["source"], "open.xlsx");
    }

    /// The team metadata flattens its base fields alongside `round`.
    #[test]
    fn team_metadata_flattens_base() {
        let meta = TeamTournamentMetadata {
            base: TournamentMetadata {
                source: "r7.xlsx".to_owned(),
                ..Default::default()
            },
            round: Some(7),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["source"], "r7.xlsx");
        assert_eq!(json["round"], 7);
    }

    /// Output round-trips through JSON without loss.
    #[test]
    fn tournament_data_json_round_trip() {
        let mut player = PlayerRanking::with_rank(1);
        player.name = Some("Jane Doe".to_owned());
        player.points = Some(4.5);
        player.rounds.push(RoundResult::bye());
        player
            .tie_breaks
            .insert("SB".to_owned(), Some(12.25));
        let data = TournamentData {
            tournament_metadata: TournamentMetadata {
                source: "t.xlsx".to_owned(),
                ..Default::default()
            },
            player_rankings: vec![player],
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: TournamentData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
