use serde::Deserialize;
use serde_json::{json, Value};
use toolhost_core::{DocumentError, DocumentStore, SearchOptions, DEFAULT_MAX_RESULTS};

use super::{parse_args, ToolDefinition, ToolError, ToolResult, ToolSet};

/// The knowledge-base tools over a directory of `.txt` documents.
pub struct DocumentTools {
    store: DocumentStore,
}

#[derive(Debug, Deserialize)]
struct ReadDocumentArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
struct SearchDocumentsArgs {
    query: String,
    max_results: Option<usize>,
}

impl DocumentTools {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    fn list_documents(&self) -> Result<ToolResult, ToolError> {
        let listing = self.store.list_documents()?;
        if listing.is_empty() {
            return Ok(ToolResult::text("No documents found"));
        }

        let mut output = String::from("Available documents:\n");
        for (category, files) in &listing {
            output.push_str(&format!("\n{}:\n", category));
            for file in files {
                output.push_str(&format!("  - {}\n", file));
            }
        }

        Ok(ToolResult::text(output.trim_end()))
    }

    fn read_document(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: ReadDocumentArgs = parse_args(arguments)?;

        match self.store.read_document(&args.path) {
            Ok(content) => Ok(ToolResult::text(content)),
            Err(DocumentError::NotFound(path)) => Ok(ToolResult::text(format!(
                "Error: Document '{}' not found",
                path
            ))),
            Err(DocumentError::IoError(e)) => {
                Ok(ToolResult::error(format!("Error reading document: {}", e)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn search_documents(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: SearchDocumentsArgs = parse_args(arguments)?;
        if args.query.is_empty() {
            return Err(ToolError::InvalidArguments(
                "query must not be empty".to_string(),
            ));
        }

        let options = SearchOptions {
            max_results: args.max_results.unwrap_or(DEFAULT_MAX_RESULTS).max(1),
        };
        let hits = self.store.search(&args.query, &options);

        if hits.is_empty() {
            return Ok(ToolResult::text(format!(
                "No results found for '{}'",
                args.query
            )));
        }

        let mut output = format!("Found {} results for '{}':\n\n", hits.len(), args.query);
        for hit in &hits {
            output.push_str(&format!(
                "## {} (line {})\n{}\n\n",
                hit.file_path, hit.line_number, hit.excerpt
            ));
        }

        Ok(ToolResult::text(output.trim_end()))
    }
}

impl ToolSet for DocumentTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "list_documents".to_string(),
                description: "List all available documents organized by category".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            ToolDefinition {
                name: "read_document".to_string(),
                description: "Read the full content of a specific document".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Document path relative to data directory (e.g., 'products/pricing.txt')"
                        }
                    },
                    "required": ["path"]
                }),
            },
            ToolDefinition {
                name: "search_documents".to_string(),
                description: "Search across all documents for keywords".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search term or phrase"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results (default: 10)",
                            "default": DEFAULT_MAX_RESULTS,
                            "minimum": 1
                        }
                    },
                    "required": ["query"]
                }),
            },
        ]
    }

    fn call(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolError> {
        match name {
            "list_documents" => self.list_documents(),
            "read_document" => self.read_document(arguments),
            "search_documents" => self.search_documents(arguments),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}
