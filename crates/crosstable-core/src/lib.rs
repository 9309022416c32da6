#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod cell;
pub mod columns;
pub mod enums;
pub mod locate;
pub mod metadata;
mod patterns;
pub mod pipeline;
pub mod profile;
pub mod structures;
pub mod team;
pub mod tiebreak;
pub mod tokens;
pub mod validation;

pub use cell::{Grid, RawCell, clean_cell, parse_date_flexible, parse_decimal_or_none, parse_int_or_none};
pub use columns::{ColumnMap, OpponentColumn, RoundGroup, TieBreakColumn, classify_headers};
pub use enums::{Color, GameResult, SideResult, TieBreakKind, TournamentFormat};
pub use locate::{find_header_row, find_section_marker, is_footer_row};
pub use metadata::extract_metadata;
pub use pipeline::parse_individual;
pub use profile::{FormatProfile, RequiredHeaders, RoundColumnMode};
pub use structures::{
    BoardPairing, PlayerRanking, RoundResult, TeamPairing, TeamRoundData, TeamTournamentMetadata,
    TournamentData, TournamentMetadata,
};
pub use team::parse_team_round;
pub use tokens::{
    BoardResult, TeamMatchScore, decode_board_result, decode_crosstable_cell,
    decode_swiss_round_token, decode_team_match_score,
};
pub use validation::{Diagnostic, RuleId, Severity, check_duplicate_ranks, validate_team_round};

/// Returns the current version of the crosstable-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
