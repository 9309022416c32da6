//! Result-token decoders: the many textual encodings of a single chess game
//! outcome, normalized into one vocabulary.
//!
//! Every decoder is a pure function from a cell string to an `Option`; `None`
//! always means "no round/score recorded here", never an error. Callers decide
//! per format whether an undecodable token is dropped or kept with its raw
//! text.

use std::sync::LazyLock;

use regex::Regex;

use crate::enums::{Color, GameResult, SideResult};
use crate::patterns::compile_literal;
use crate::structures::{PlayerRanking, RoundResult};

// Opponent number, color letter, and result symbol, with optional space,
// dash, dot, or slash separators between the three parts. Covers "12w1",
// "12 w 1", "12-w-1", "12w+", and the "=" / "½" draw symbols.
static SWISS_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_literal(r"(?i)^(\d+)[\s\-./]*([wb])[\s\-./]*(1|0|½|\+|=|-|0[.,]5)$")
});

/// Decodes a Swiss per-round token like `"12w1"` into a round result.
///
/// Returns `None` only when no dialect pattern matches. Bye markers
/// (`"bye"`, `"spielfrei"`, `"free"`) decode to the bye shape.
pub fn decode_swiss_round_token(value: &str) -> Option<RoundResult> {
    let token = value.trim();
    if token.is_empty() {
        return None;
    }

    match token.to_lowercase().as_str() {
        "bye" | "spielfrei" | "free" => return Some(RoundResult::bye()),
        _ => {}
    }

    let caps = SWISS_TOKEN_RE.captures(token)?;
    let opponent = caps.get(1)?.as_str().to_owned();
    let color = match caps.get(2)?.as_str().to_lowercase().as_str() {
        "w" => Color::White,
        _ => Color::Black,
    };
    let result = decode_result_symbol(caps.get(3)?.as_str())?;

    Some(RoundResult::game(
        Some(opponent),
        Some(color),
        Some(result),
        token,
    ))
}

fn decode_result_symbol(symbol: &str) -> Option<GameResult> {
    match symbol {
        "1" | "+" => Some(GameResult::Win),
        "0" | "-" => Some(GameResult::Loss),
        "½" | "=" | "0.5" | "0,5" => Some(GameResult::Draw),
        _ => None,
    }
}

/// Decodes one cross-table cell for the player at `player_index`.
///
/// The opponent is identified by `opponent_rank` (the numeric column header);
/// the opponent reference is resolved against `players`, the standings parsed
/// so far. An unresolved rank still decodes, with a `#rank` placeholder label.
///
/// `"*"` (the player's own column) and empty or `"-"` cells (no game) decode
/// to `None`: no round is recorded, which is not an error. Undecodable tokens
/// also yield `None` — in the cross-table format such a round is dropped.
pub fn decode_crosstable_cell(
    value: &str,
    opponent_rank: u32,
    players: &[PlayerRanking],
    player_index: usize,
) -> Option<RoundResult> {
    let token = value.trim();
    if token.is_empty() || token == "-" || token == "*" {
        return None;
    }
    if players
        .get(player_index)
        .is_some_and(|p| p.rank == opponent_rank)
    {
        // Own column; some exports leave a stray result here.
        return None;
    }

    let result = match token.to_lowercase().as_str() {
        "1" | "+" | "w" | "win" => GameResult::Win,
        "0" | "l" | "loss" | "lost" => GameResult::Loss,
        "½" | "0.5" | "0,5" | "=" | "d" | "draw" => GameResult::Draw,
        _ => return None,
    };

    let opponent = players
        .iter()
        .find(|p| p.rank == opponent_rank)
        .and_then(|p| p.name.clone())
        .unwrap_or_else(|| format!("#{opponent_rank}"));

    Some(RoundResult::game(Some(opponent), None, Some(result), token))
}

/// A decoded team-match aggregate score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamMatchScore {
    pub white: f64,
    pub black: f64,
    /// Forfeit is inferred by the team parser once board rows are known
    /// (one side at zero plus a missing player); the decoder itself never
    /// sets it.
    pub is_forfeit: bool,
}

/// Decodes a team-match score like `"4½ - 1½"`, `"4.5-1.5"`, or `"3:3"`.
///
/// Accepts colon, hyphen, and en-dash separators; `½` and `.5`/`,5` fractions
/// both parse to half points.
pub fn decode_team_match_score(value: &str) -> Option<TeamMatchScore> {
    let normalized = value.trim().replace(['–', '—'], "-");
    if normalized.is_empty() {
        return None;
    }

    let (left, right) = if let Some((l, r)) = normalized.split_once(':') {
        (l, r)
    } else {
        normalized.split_once('-')?
    };

    let white = parse_fraction_score(left)?;
    let black = parse_fraction_score(right)?;
    Some(TeamMatchScore {
        white,
        black,
        is_forfeit: false,
    })
}

/// Parses a score with an optional `½` suffix: `"4½"` → 4.5, `"½"` → 0.5.
fn parse_fraction_score(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s == "½" {
        return Some(0.5);
    }
    if let Some(whole) = s.strip_suffix('½') {
        return whole.trim().parse::<f64>().ok().map(|w| w + 0.5);
    }
    s.replace(',', ".").parse::<f64>().ok()
}

/// A decoded board-level result within a team match.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardResult {
    /// Canonical result string, e.g. `"1:0"`, `"½:½"`, `"-:-"` for unplayed.
    pub result: String,
    pub white_score: f64,
    pub black_score: f64,
    pub white_result: SideResult,
    pub black_result: SideResult,
}

/// Decodes one board result cell.
///
/// Accepts `"1:0"`, `"0:1"`, `"½:½"` (also `"0.5:0.5"`), colons with spaces,
/// forfeit markers `"+:-"` / `"-:+"`, and treats empty, `":"`, and `"-:-"`
/// cells as an unplayed board with both sides at zero and tagged forfeit.
pub fn decode_board_result(value: &str) -> Option<BoardResult> {
    let token: String = value.trim().chars().filter(|c| !c.is_whitespace()).collect();

    if token.is_empty() || token == ":" || token == "-:-" || token == "-" {
        return Some(BoardResult {
            result: "-:-".to_owned(),
            white_score: 0.0,
            black_score: 0.0,
            white_result: SideResult::Forfeit,
            black_result: SideResult::Forfeit,
        });
    }

    match token.as_str() {
        "+:-" => {
            return Some(BoardResult {
                result: "+:-".to_owned(),
                white_score: 1.0,
                black_score: 0.0,
                white_result: SideResult::Win,
                black_result: SideResult::Forfeit,
            });
        }
        "-:+" => {
            return Some(BoardResult {
                result: "-:+".to_owned(),
                white_score: 0.0,
                black_score: 1.0,
                white_result: SideResult::Forfeit,
                black_result: SideResult::Win,
            });
        }
        _ => {}
    }

    let (left, right) = token.split_once(':')?;
    let white_score = parse_fraction_score(left)?;
    let black_score = parse_fraction_score(right)?;

    let (white_result, black_result) = if white_score > black_score {
        (SideResult::Win, SideResult::Loss)
    } else if white_score < black_score {
        (SideResult::Loss, SideResult::Win)
    } else if (white_score - 0.5).abs() < f64::EPSILON {
        (SideResult::Draw, SideResult::Draw)
    } else {
        // 0:0 — a double default.
        (SideResult::Loss, SideResult::Loss)
    };

    Some(BoardResult {
        result: format!("{}:{}", format_score(white_score), format_score(black_score)),
        white_score,
        black_score,
        white_result,
        black_result,
    })
}

fn format_score(score: f64) -> String {
    if (score - 0.5).abs() < f64::EPSILON {
        "½".to_owned()
    } else if score == score.floor() {
        format!("{}", score as i64)
    } else {
        score.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    /// Every supported Swiss dialect of the same game decodes to the same
    /// canonical shape (only `raw` differs).
    #[test]
    fn swiss_token_dialects_are_equivalent() {
        for token in ["12w1", "12 w 1", "12-w-1", "12.w.1", "12W1"] {
            let round = decode_swiss_round_token(token).expect(token);
            assert_eq!(round.opponent.as_deref(), Some("12"));
            assert_eq!(round.color, Some(Color::White));
            assert_eq!(round.result, Some(GameResult::Win));
            assert_eq!(round.raw.as_deref(), Some(token));
        }
    }

    #[test]
    fn swiss_token_alternate_symbols() {
        let win = decode_swiss_round_token("12w+").unwrap();
        assert_eq!(win.result, Some(GameResult::Win));

        let loss = decode_swiss_round_token("3b-").unwrap();
        assert_eq!(loss.color, Some(Color::Black));
        assert_eq!(loss.result, Some(GameResult::Loss));

        let draw_eq = decode_swiss_round_token("7b=").unwrap();
        assert_eq!(draw_eq.result, Some(GameResult::Draw));

        let draw_half = decode_swiss_round_token("7b½").unwrap();
        assert_eq!(draw_half.result, Some(GameResult::Draw));

        let draw_decimal = decode_swiss_round_token("7 b 0.5").unwrap();
        assert_eq!(draw_decimal.result, Some(GameResult::Draw));
    }

    #[test]
    fn swiss_bye_markers() {
        let bye = decode_swiss_round_token("bye").unwrap();
        assert_eq!(bye, RoundResult::bye());
        assert_eq!(decode_swiss_round_token("Spielfrei").unwrap(), RoundResult::bye());
    }

    #[test]
    fn swiss_garbage_is_none() {
        assert_eq!(decode_swiss_round_token(""), None);
        assert_eq!(decode_swiss_round_token("w1"), None);
        assert_eq!(decode_swiss_round_token("12x1"), None);
        assert_eq!(decode_swiss_round_token("hello"), None);
    }

    fn sample_players() -> Vec<PlayerRanking> {
        let mut a = PlayerRanking::with_rank(1);
        a.name = Some("Alice".to_owned());
        let mut b = PlayerRanking::with_rank(2);
        b.name = Some("Bob".to_owned());
        vec![a, b]
    }

    /// `*` (self) and empty/`-` cells record no round, for any rank.
    #[test]
    fn crosstable_self_and_no_game_are_none() {
        let players = sample_players();
        for rank in [1, 2, 99] {
            assert_eq!(decode_crosstable_cell("*", rank, &players, 0), None);
            assert_eq!(decode_crosstable_cell("", rank, &players, 0), None);
            assert_eq!(decode_crosstable_cell("-", rank, &players, 0), None);
        }
    }

    #[test]
    fn crosstable_resolves_opponent_by_rank() {
        let players = sample_players();
        let round = decode_crosstable_cell("1", 2, &players, 0).unwrap();
        assert_eq!(round.opponent.as_deref(), Some("Bob"));
        assert_eq!(round.result, Some(GameResult::Win));
        assert_eq!(round.color, None);
    }

    /// An unresolved rank still decodes, with a placeholder opponent label.
    #[test]
    fn crosstable_unresolved_rank_uses_placeholder() {
        let players = sample_players();
        let round = decode_crosstable_cell("½", 7, &players, 0).unwrap();
        assert_eq!(round.opponent.as_deref(), Some("#7"));
        assert_eq!(round.result, Some(GameResult::Draw));
    }

    #[test]
    fn crosstable_word_and_letter_tokens() {
        let players = sample_players();
        for (token, expected) in [
            ("w", GameResult::Win),
            ("WIN", GameResult::Win),
            ("d", GameResult::Draw),
            ("draw", GameResult::Draw),
            ("l", GameResult::Loss),
            ("Loss", GameResult::Loss),
            ("+", GameResult::Win),
            ("=", GameResult::Draw),
        ] {
            let round = decode_crosstable_cell(token, 2, &players, 0).expect(token);
            assert_eq!(round.result, Some(expected), "token {token:?}");
        }
        assert_eq!(decode_crosstable_cell("??", 2, &players, 0), None);
    }

    /// A stray token in the player's own column is dropped.
    #[test]
    fn crosstable_own_column_is_skipped() {
        let players = sample_players();
        assert_eq!(decode_crosstable_cell("1", 1, &players, 0), None);
    }

    /// Half-point team scores parse identically from `½` glyphs and decimals.
    #[test]
    fn team_match_score_half_points() {
        let glyph = decode_team_match_score("4½ - 1½").unwrap();
        assert_eq!(glyph.white, 4.5);
        assert_eq!(glyph.black, 1.5);
        assert!(!glyph.is_forfeit);

        let decimal = decode_team_match_score("4.5-1.5").unwrap();
        assert_eq!((decimal.white, decimal.black), (glyph.white, glyph.black));
    }

    #[test]
    fn team_match_score_separator_variants() {
        for s in ["3:3", "3 - 3", "3–3"] {
            let score = decode_team_match_score(s).expect(s);
            assert_eq!((score.white, score.black), (3.0, 3.0));
        }
        assert_eq!(decode_team_match_score(""), None);
        assert_eq!(decode_team_match_score("abc"), None);
    }

    #[test]
    fn board_result_standard_outcomes() {
        let win = decode_board_result("1:0").unwrap();
        assert_eq!(win.white_result, SideResult::Win);
        assert_eq!(win.black_result, SideResult::Loss);
        assert_eq!((win.white_score, win.black_score), (1.0, 0.0));

        let draw = decode_board_result("½ : ½").unwrap();
        assert_eq!(draw.result, "½:½");
        assert_eq!(draw.white_result, SideResult::Draw);
        assert_eq!((draw.white_score, draw.black_score), (0.5, 0.5));

        let draw_decimal = decode_board_result("0.5:0.5").unwrap();
        assert_eq!(draw_decimal.result, "½:½");
    }

    /// An empty or bare-colon cell is an unplayed board: both scores zero,
    /// both sides tagged forfeit.
    #[test]
    fn board_result_unplayed_board() {
        for token in ["", ":", "-:-"] {
            let board = decode_board_result(token).expect("unplayed decodes");
            assert_eq!((board.white_score, board.black_score), (0.0, 0.0));
            assert_eq!(board.white_result, SideResult::Forfeit);
            assert_eq!(board.black_result, SideResult::Forfeit);
            assert_eq!(board.result, "-:-");
        }
    }

    #[test]
    fn board_result_forfeit_markers() {
        let white_ff = decode_board_result("+:-").unwrap();
        assert_eq!(white_ff.white_result, SideResult::Win);
        assert_eq!(white_ff.black_result, SideResult::Forfeit);
        assert_eq!((white_ff.white_score, white_ff.black_score), (1.0, 0.0));

        let black_ff = decode_board_result("-:+").unwrap();
        assert_eq!(black_ff.white_result, SideResult::Forfeit);
        assert_eq!(black_ff.black_result, SideResult::Win);
    }
}
