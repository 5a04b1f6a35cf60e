use crate::range::CellRange;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const COL_ID: usize = 0;
pub const COL_QUESTION: usize = 1;
pub const COL_STATUS: usize = 2;
pub const COL_ANSWER: usize = 3;
pub const COL_ANSWERED_AT: usize = 4;
pub const COL_ANSWERED_BY: usize = 5;

/// Written to the `answered_by` column for every posted answer.
pub const RESPONDER_TAG: &str = "AI";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("sheets api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Range-based access to a 2-D grid of string cells.
///
/// Reads drop trailing empty cells and trailing empty rows, so callers must
/// treat short rows as having empty trailing fields.
pub trait SheetStore: Send + Sync {
    fn get_range(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError>;

    fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unanswered,
    Answered,
    Reviewed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Unanswered, Status::Answered, Status::Reviewed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unanswered => "unanswered",
            Status::Answered => "answered",
            Status::Reviewed => "reviewed",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Status::as_str).collect()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status '{0}' (expected one of unanswered, answered, reviewed)")]
pub struct StatusParseError(pub String);

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

/// One data row of the Q&A sheet. Missing trailing cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRow {
    /// 1-based sheet row, the physical address used for writes.
    pub row_index: usize,
    pub question_id: Option<String>,
    pub question_text: Option<String>,
    pub status: Option<String>,
    pub answer_text: Option<String>,
    pub answered_at: Option<String>,
    pub answered_by: Option<String>,
}

impl QaRow {
    pub fn from_cells(row_index: usize, cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned();
        Self {
            row_index,
            question_id: cell(COL_ID),
            question_text: cell(COL_QUESTION),
            status: cell(COL_STATUS),
            answer_text: cell(COL_ANSWER),
            answered_at: cell(COL_ANSWERED_AT),
            answered_by: cell(COL_ANSWERED_BY),
        }
    }

    pub fn id(&self) -> &str {
        self.question_id.as_deref().unwrap_or_default()
    }

    pub fn question(&self) -> &str {
        self.question_text.as_deref().unwrap_or_default()
    }

    /// A row without a status cell never counts as unanswered.
    pub fn is_unanswered(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().to_lowercase() == Status::Unanswered.as_str())
    }

    pub fn matches_id(&self, question_id: &str) -> bool {
        self.question_id.as_deref() == Some(question_id)
    }
}

/// A full read of the sheet, header excluded.
#[derive(Debug, Clone, Default)]
pub struct SheetSnapshot {
    /// True when the range came back with no rows at all, not even a header.
    pub empty: bool,
    pub rows: Vec<QaRow>,
}

impl SheetSnapshot {
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let empty = grid.is_empty();
        let rows = grid
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, cells)| QaRow::from_cells(i + 1, cells))
            .collect();
        Self { empty, rows }
    }

    pub fn unanswered(&self) -> impl Iterator<Item = &QaRow> {
        self.rows.iter().filter(|row| row.is_unanswered())
    }

    /// First row whose id cell equals `question_id` exactly.
    pub fn find(&self, question_id: &str) -> Option<&QaRow> {
        self.rows.iter().find(|row| row.matches_id(question_id))
    }
}

/// Stateless view of one Q&A tab. Every operation re-reads the sheet.
pub struct QuestionLedger<'a> {
    store: &'a dyn SheetStore,
    spreadsheet_id: &'a str,
    sheet_name: &'a str,
}

impl<'a> QuestionLedger<'a> {
    pub fn new(store: &'a dyn SheetStore, spreadsheet_id: &'a str, sheet_name: &'a str) -> Self {
        Self {
            store,
            spreadsheet_id,
            sheet_name,
        }
    }

    pub fn read_range(&self) -> CellRange {
        CellRange::columns(self.sheet_name, COL_ID, COL_ANSWERED_BY)
    }

    pub fn snapshot(&self) -> Result<SheetSnapshot, SheetError> {
        let grid = self
            .store
            .get_range(self.spreadsheet_id, &self.read_range())?;
        Ok(SheetSnapshot::from_grid(grid))
    }

    /// Overwrites status, answer, timestamp and responder on the matching row.
    /// Returns the row as it was before the write, or `None` if no row matched.
    pub fn post_answer(
        &self,
        question_id: &str,
        answer: &str,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<QaRow>, SheetError> {
        let snapshot = self.snapshot()?;
        let Some(row) = snapshot.find(question_id) else {
            return Ok(None);
        };

        let range = CellRange::row_span(self.sheet_name, COL_STATUS, COL_ANSWERED_BY, row.row_index);
        let values = vec![vec![
            Status::Answered.as_str().to_string(),
            answer.to_string(),
            format_timestamp(answered_at),
            RESPONDER_TAG.to_string(),
        ]];
        self.store.update_range(self.spreadsheet_id, &range, values)?;

        Ok(Some(row.clone()))
    }

    /// Overwrites only the status cell of the matching row.
    pub fn update_status(
        &self,
        question_id: &str,
        status: Status,
    ) -> Result<Option<QaRow>, SheetError> {
        let snapshot = self.snapshot()?;
        let Some(row) = snapshot.find(question_id) else {
            return Ok(None);
        };

        let range = CellRange::cell(self.sheet_name, COL_STATUS, row.row_index);
        self.store.update_range(
            self.spreadsheet_id,
            &range,
            vec![vec![status.as_str().to_string()]],
        )?;

        Ok(Some(row.clone()))
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
