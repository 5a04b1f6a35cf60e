use crate::ledger::{SheetError, SheetStore};
use crate::range::CellRange;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-process grid with the read/write semantics of the hosted sheets API.
///
/// The spreadsheet id is ignored: one grid backs every id and tab.
#[derive(Debug, Default)]
pub struct MemorySheet {
    grid: Mutex<Vec<Vec<String>>>,
    writes: AtomicUsize,
}

impl MemorySheet {
    pub fn from_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let grid = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self {
            grid: Mutex::new(grid),
            writes: AtomicUsize::new(0),
        }
    }

    /// Copy of the whole grid as stored, including empty cells.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.grid.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of successful `update_range` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SheetStore for MemorySheet {
    fn get_range(
        &self,
        _spreadsheet_id: &str,
        range: &CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let grid = self.grid.lock().unwrap_or_else(|e| e.into_inner());

        let first = range.start_row.unwrap_or(1).max(1) - 1;
        let last = range.end_row.unwrap_or(grid.len()).min(grid.len());

        let mut values: Vec<Vec<String>> = grid
            .get(first..last)
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row
                    .iter()
                    .skip(range.start_column)
                    .take(range.width())
                    .cloned()
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while values.last().is_some_and(|row| row.is_empty()) {
            values.pop();
        }

        Ok(values)
    }

    fn update_range(
        &self,
        _spreadsheet_id: &str,
        range: &CellRange,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let Some(start_row) = range.start_row.filter(|r| *r > 0) else {
            return Err(SheetError::Api {
                status: 400,
                message: format!("update range {} has no start row", range),
            });
        };

        let mut grid = self.grid.lock().unwrap_or_else(|e| e.into_inner());

        for (offset, row_values) in values.into_iter().enumerate() {
            let row_idx = start_row - 1 + offset;
            if grid.len() <= row_idx {
                grid.resize_with(row_idx + 1, Vec::new);
            }
            let row = &mut grid[row_idx];
            for (col_offset, value) in row_values.into_iter().enumerate() {
                let col = range.start_column + col_offset;
                if row.len() <= col {
                    row.resize(col + 1, String::new());
                }
                row[col] = value;
            }
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
