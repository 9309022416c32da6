//! Clap CLI definition: root struct, subcommands, and the format selector.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};


/// Export format of the input sheet.
///
/// The engine never auto-detects a format; the caller states which export
/// produced the file.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    /// Legacy Swiss individual export (chess-results style).
    Swiss,
    /// Enhanced Swiss-Manager individual export with labeled tie-breaks.
    SwissManager,
    /// Round-robin individual cross-table.
    RoundRobin,
    /// Team/board-match round report.
    Team,
}

/// All top-level subcommands exposed by the `crosstable` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Parse a tournament spreadsheet and print the result as JSON.
    Parse {
        /// Path to an .xlsx/.xls file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Export format of the sheet.
        #[arg(long)]
        format: Format,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the crosstable-core library version.
    Version,
}

#[derive(Parser)]
#[command(name = "crosstable", about = "Chess tournament spreadsheet parser", version)]
pub struct Cli {
    /// Increase trace verbosity (-v = debug, -vv = trace). Logs go to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}
