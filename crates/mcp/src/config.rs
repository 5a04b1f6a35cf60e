//! Start-up configuration for the two servers.
//!
//! Every value can come from a flag or from the environment (after `.env` is
//! loaded). Nothing here aborts start-up: a missing credentials file or an
//! unset spreadsheet id leaves the Q&A tools answering with a configuration
//! error instead.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use toolhost_core::{DocumentStore, SheetStore};
use tracing::{error, info, warn};

use crate::server::{McpServer, DOCUMENTS_SERVER_NAME, SHEETS_SERVER_NAME};
use crate::sheets::SheetsClient;
use crate::tools::{DocumentTools, QuestionTools};

const MASK_KEEP: usize = 10;

#[derive(Debug, Clone, Args)]
pub struct SheetsConfig {
    #[arg(long, env = "GOOGLE_SHEETS_ID", help = "Spreadsheet holding the Q&A log")]
    pub spreadsheet_id: Option<String>,
    #[arg(
        long,
        env = "GOOGLE_CREDENTIALS_PATH",
        default_value = "./google-credentials.json",
        help = "Service-account key file"
    )]
    pub credentials: PathBuf,
    #[arg(long, env = "SHEET_NAME", default_value = "Sheet1", help = "Sheet tab name")]
    pub sheet_name: String,
}

impl SheetsConfig {
    /// The spreadsheet id with its middle elided, for logs.
    pub fn masked_id(&self) -> Option<String> {
        self.spreadsheet_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(mask)
    }

    /// Load credentials and build the API client. Failures are logged and
    /// yield `None`.
    pub fn connect(&self) -> Option<Arc<dyn SheetStore>> {
        match self.masked_id() {
            Some(masked) => info!(spreadsheet = %masked, sheet = %self.sheet_name, "using spreadsheet"),
            None => warn!("GOOGLE_SHEETS_ID not set"),
        }

        if !self.credentials.exists() {
            error!(path = %self.credentials.display(), "credentials file not found");
            return None;
        }

        match SheetsClient::from_credentials(&self.credentials) {
            Ok(client) => {
                info!(account = client.service_account(), "loaded Google credentials");
                let store: Arc<dyn SheetStore> = Arc::new(client);
                Some(store)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "failed to initialise Google Sheets client");
                None
            }
        }
    }

    pub fn build_server(&self) -> McpServer {
        let tools = QuestionTools::new(
            self.connect(),
            self.spreadsheet_id.clone(),
            self.sheet_name.clone(),
        );
        McpServer::new(SHEETS_SERVER_NAME, tools)
    }
}

fn mask(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= MASK_KEEP * 2 {
        return id.to_string();
    }

    let head: String = chars[..MASK_KEEP].iter().collect();
    let tail: String = chars[chars.len() - MASK_KEEP..].iter().collect();
    format!("{}...{}", head, tail)
}

#[derive(Debug, Clone, Args)]
pub struct DocumentsConfig {
    #[arg(
        long,
        env = "KNOWLEDGE_BASE_DIR",
        default_value = "./data",
        help = "Root directory of the knowledge base"
    )]
    pub data_dir: PathBuf,
}

impl DocumentsConfig {
    pub fn build_server(&self) -> McpServer {
        let store = DocumentStore::new(&self.data_dir);

        if self.data_dir.is_dir() {
            info!(
                root = %self.data_dir.display(),
                documents = store.document_count(),
                "serving knowledge base"
            );
        } else {
            warn!(root = %self.data_dir.display(), "knowledge base directory does not exist");
        }

        McpServer::new(DOCUMENTS_SERVER_NAME, DocumentTools::new(store))
    }
}
