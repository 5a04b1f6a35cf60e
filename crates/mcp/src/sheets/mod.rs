//! Google Sheets v4 adapter for the Q&A ledger.

mod auth;
mod client;

pub use auth::{ServiceAccountKey, TokenSource, SHEETS_SCOPE};
pub use client::SheetsClient;
