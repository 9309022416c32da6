use std::io::Cursor;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, Format};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse {
            file,
            format,
            pretty,
        } => match run_parse(&file, format, pretty) {
            Ok(output) => {
                for warning in &output.warnings {
                    eprintln!("warning: {warning}");
                }
                println!("{}", output.json);
                ExitCode::SUCCESS
            }
            Err(message) => {
                error!("{message}");
                ExitCode::FAILURE
            }
        },
        Command::Version => {
            println!("{}", crosstable_core::version());
            ExitCode::SUCCESS
        }
    }
}

/// Trace output goes to stderr so stdout stays valid JSON. `RUST_LOG`
/// overrides the `-v` flags.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let init = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if init.is_err() {
        // A subscriber is already installed (tests); keep it.
        tracing::debug!("tracing subscriber already installed");
    }
}

#[derive(Debug)]
struct ParseOutput {
    json: String,
    warnings: Vec<String>,
}

fn run_parse(path: &Path, format: Format, pretty: bool) -> Result<ParseOutput, String> {
    // The whole workbook is read up front; the parsers take a cloneable
    // in-memory buffer.
    let bytes = std::fs::read(path)
        .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let reader = Cursor::new(bytes);
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_owned();

    match format {
        Format::Swiss => to_output(crosstable_excel::parse_swiss(reader, &filename), pretty),
        Format::SwissManager => {
            to_output(crosstable_excel::parse_swiss_manager(reader, &filename), pretty)
        }
        Format::RoundRobin => {
            to_output(crosstable_excel::parse_round_robin(reader, &filename), pretty)
        }
        Format::Team => {
            let (data, diagnostics) = crosstable_excel::parse_team_round(reader, &filename)
                .map_err(|e| e.to_string())?;
            Ok(ParseOutput {
                json: serialize(&data, pretty)?,
                warnings: diagnostics.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

fn to_output<T: Serialize>(
    result: Result<T, crosstable_excel::ImportError>,
    pretty: bool,
) -> Result<ParseOutput, String> {
    let data = result.map_err(|e| e.to_string())?;
    Ok(ParseOutput {
        json: serialize(&data, pretty)?,
        warnings: Vec::new(),
    })
}

fn serialize<T: Serialize>(data: &T, pretty: bool) -> Result<String, String> {
    let out = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    };
    out.map_err(|e| format!("serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use std::io::Write;

    use super::*;

    /// A buffer that is not a workbook surfaces the container error.
    #[test]
    fn garbage_file_reports_workbook_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"not a spreadsheet").expect("write");

        let err = run_parse(file.path(), Format::Swiss, false).unwrap_err();
        assert!(err.contains("workbook read error"), "got: {err}");
    }

    /// A missing path fails with the open error, not a panic.
    #[test]
    fn missing_file_reports_open_error() {
        let err = run_parse(Path::new("/no/such/file.xlsx"), Format::Team, false).unwrap_err();
        assert!(err.contains("cannot open"), "got: {err}");
    }
}
