/// Errors produced while opening a workbook.
///
/// This is the only error surface of the engine: everything past the
/// workbook container parses fail-soft and degrades to partial data instead
/// of erroring.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The byte buffer is not a readable `.xlsx`/`.xls` container.
    #[error("workbook read error: {detail}")]
    WorkbookRead { detail: String },

    /// The workbook opened but holds no worksheet to read.
    #[error("workbook contains no readable worksheet")]
    NoWorksheet,
}
