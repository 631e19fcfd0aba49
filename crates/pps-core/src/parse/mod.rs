//! Row parsing: date and key normalization, column tables, record parsers.

mod columns;
mod date;
mod key;
mod records;

pub use columns::*;
pub use date::*;
pub use key::*;
pub use records::*;

use chrono::{DateTime, Utc};
use csv::StringRecord;

/// One CSV data row viewed through a column map.
///
/// Accessors take canonical column positions; a position that is unmapped or
/// beyond the end of the row reads as an empty cell.
pub struct Cells<'a> {
    record: &'a StringRecord,
    map: &'a ColumnMap,
}

impl<'a> Cells<'a> {
    pub fn new(record: &'a StringRecord, map: &'a ColumnMap) -> Self {
        Self { record, map }
    }

    /// Number of physical cells in the row.
    pub fn width(&self) -> usize {
        self.record.len()
    }

    /// Raw cell content.
    pub fn raw(&self, column: usize) -> &'a str {
        self.map
            .physical(column)
            .and_then(|index| self.record.get(index))
            .unwrap_or("")
    }

    /// Text cell, verbatim.
    pub fn text(&self, column: usize) -> String {
        self.raw(column).to_string()
    }

    /// Integer cell; zero when blank or malformed.
    pub fn int(&self, column: usize) -> i64 {
        self.raw(column).trim().parse().unwrap_or(0)
    }

    /// Decimal cell; zero when blank, malformed, or not finite.
    pub fn float(&self, column: usize) -> f64 {
        self.raw(column)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Date cell; `None` when blank or in no known format.
    pub fn date(&self, column: usize) -> Option<DateTime<Utc>> {
        parse_date(self.raw(column))
    }

    /// Key cell with any compound form path stripped.
    pub fn key(&self, column: usize) -> String {
        normalize_key(self.raw(column)).to_string()
    }
}

/// Build a record from one data row. Never fails: absent or malformed cells
/// leave the field at its zero value.
pub trait FromCells: Sized {
    /// Column table this record is parsed with.
    fn layout() -> &'static Layout;

    fn from_cells(cells: &Cells<'_>) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> StringRecord {
        StringRecord::from(values.to_vec())
    }

    #[test]
    fn test_cell_accessors() {
        let record = row(&["42", " 3.5 ", "2023-05-01", "p1/Antibioticform/x[1]", "text"]);
        let map = ColumnMap::positional(&SPECIMEN_LAYOUT);
        let cells = Cells::new(&record, &map);

        assert_eq!(cells.width(), 5);
        assert_eq!(cells.int(0), 42);
        assert_eq!(cells.float(1), 3.5);
        assert!(cells.date(2).is_some());
        assert_eq!(cells.key(3), "p1");
        assert_eq!(cells.text(4), "text");
    }

    #[test]
    fn test_malformed_numbers_are_zero() {
        let record = row(&["4x", "NaN", "inf", "1,5", ""]);
        let map = ColumnMap::positional(&SPECIMEN_LAYOUT);
        let cells = Cells::new(&record, &map);

        assert_eq!(cells.int(0), 0);
        assert_eq!(cells.float(1), 0.0);
        assert_eq!(cells.float(2), 0.0);
        assert_eq!(cells.float(3), 0.0);
        assert_eq!(cells.int(4), 0);
    }

    #[test]
    fn test_out_of_range_reads_empty() {
        let record = row(&["only"]);
        let map = ColumnMap::positional(&SPECIMEN_LAYOUT);
        let cells = Cells::new(&record, &map);

        assert_eq!(cells.raw(5), "");
        assert_eq!(cells.raw(99), "");
        assert_eq!(cells.date(3), None);
    }
}
