/// Conversion from calamine's cell model to the engine's [`RawCell`] grid.
///
/// Everything downstream of this module is spreadsheet-library-agnostic.
use calamine::{Data, Range};

use crosstable_core::{Grid, RawCell};

/// Converts a worksheet range to a row-major grid of raw cells.
pub(crate) fn range_to_grid(range: &Range<Data>) -> Grid {
    let rows = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    Grid::from_rows(rows)
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        // Dates pass through as serial numbers; the core date parser owns
        // the epoch arithmetic.
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(_) | Data::Empty => RawCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use calamine::CellErrorType;

    use super::*;

    #[test]
    fn cells_convert_to_raw_model() {
        assert_eq!(
            convert_cell(&Data::String("Jane".to_owned())),
            RawCell::Text("Jane".to_owned())
        );
        assert_eq!(convert_cell(&Data::Float(4.5)), RawCell::Number(4.5));
        assert_eq!(convert_cell(&Data::Int(1800)), RawCell::Number(1800.0));
        assert_eq!(
            convert_cell(&Data::Bool(true)),
            RawCell::Text("true".to_owned())
        );
        assert_eq!(convert_cell(&Data::Empty), RawCell::Empty);
        // Formula errors read as empty cells, not as text.
        assert_eq!(
            convert_cell(&Data::Error(CellErrorType::Div0)),
            RawCell::Empty
        );
    }
}
