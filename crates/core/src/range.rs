use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular A1-notation range on one sheet tab.
///
/// Columns are zero-based indices (`0` is column `A`), rows are one-based as
/// in the spreadsheet UI. A range without rows spans whole columns
/// (`Sheet1!A:F`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub sheet: String,
    pub start_column: usize,
    pub end_column: usize,
    pub start_row: Option<usize>,
    pub end_row: Option<usize>,
}

impl CellRange {
    /// Whole columns `start..=end`, every row.
    pub fn columns(sheet: impl Into<String>, start_column: usize, end_column: usize) -> Self {
        Self {
            sheet: sheet.into(),
            start_column,
            end_column,
            start_row: None,
            end_row: None,
        }
    }

    /// Columns `start..=end` of a single row.
    pub fn row_span(
        sheet: impl Into<String>,
        start_column: usize,
        end_column: usize,
        row: usize,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            start_column,
            end_column,
            start_row: Some(row),
            end_row: Some(row),
        }
    }

    pub fn cell(sheet: impl Into<String>, column: usize, row: usize) -> Self {
        Self::row_span(sheet, column, column, row)
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_column == self.end_column
            && self.start_row.is_some()
            && self.start_row == self.end_row
    }

    pub fn width(&self) -> usize {
        self.end_column.saturating_sub(self.start_column) + 1
    }

    fn sheet_prefix(&self) -> String {
        let plain = !self.sheet.is_empty()
            && self
                .sheet
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            self.sheet.clone()
        } else {
            format!("'{}'", self.sheet.replace('\'', "''"))
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = column_letter(self.start_column);
        let end = column_letter(self.end_column);
        let row = |r: Option<usize>| r.map(|r| r.to_string()).unwrap_or_default();

        if self.is_single_cell() {
            return write!(f, "{}!{}{}", self.sheet_prefix(), start, row(self.start_row));
        }

        write!(
            f,
            "{}!{}{}:{}{}",
            self.sheet_prefix(),
            start,
            row(self.start_row),
            end,
            row(self.end_row)
        )
    }
}

/// Spreadsheet column label for a zero-based index: 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(5), "F");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn renders_open_column_range() {
        assert_eq!(CellRange::columns("Sheet1", 0, 5).to_string(), "Sheet1!A:F");
    }

    #[test]
    fn renders_row_span_and_cell() {
        assert_eq!(CellRange::row_span("Sheet1", 2, 5, 7).to_string(), "Sheet1!C7:F7");
        assert_eq!(CellRange::cell("Sheet1", 2, 7).to_string(), "Sheet1!C7");
    }

    #[test]
    fn quotes_sheet_names_with_spaces() {
        assert_eq!(
            CellRange::columns("Q&A Log", 0, 5).to_string(),
            "'Q&A Log'!A:F"
        );
        assert_eq!(
            CellRange::cell("Bob's tab", 0, 1).to_string(),
            "'Bob''s tab'!A1"
        );
    }

    #[test]
    fn width_counts_inclusive_columns() {
        assert_eq!(CellRange::row_span("S", 2, 5, 1).width(), 4);
        assert_eq!(CellRange::cell("S", 2, 1).width(), 1);
    }
}
