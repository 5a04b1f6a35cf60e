pub mod documents;
pub mod ledger;
pub mod memory;
pub mod range;
pub mod search;
#[cfg(test)]
mod testutils;
pub mod utils;

pub use documents::{DocumentError, DocumentListing, DocumentStore};
pub use ledger::{
    QaRow, QuestionLedger, SheetError, SheetSnapshot, SheetStore, Status, StatusParseError,
    RESPONDER_TAG,
};
pub use memory::MemorySheet;
pub use range::{column_letter, CellRange};
pub use search::{search_documents, SearchHit, SearchOptions, DEFAULT_MAX_RESULTS};
pub use utils::{has_text_extension, is_text_file, relative_display, walk_text_files};
