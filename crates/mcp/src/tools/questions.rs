use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolhost_core::{QuestionLedger, SheetStore, Status};

use super::{parse_args, ToolDefinition, ToolError, ToolResult, ToolSet};

pub const NOT_CONFIGURED: &str =
    "Google Sheets not configured. Check credentials and environment variables.";
pub const SPREADSHEET_ID_MISSING: &str = "GOOGLE_SHEETS_ID not set in environment";

/// The spreadsheet Q&A tools. `client` is `None` when credentials could not be
/// loaded at start-up.
pub struct QuestionTools {
    client: Option<Arc<dyn SheetStore>>,
    spreadsheet_id: Option<String>,
    sheet_name: String,
}

#[derive(Debug, Deserialize)]
struct GetQuestionArgs {
    question_id: String,
}

#[derive(Debug, Deserialize)]
struct PostAnswerArgs {
    question_id: String,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusArgs {
    question_id: String,
    status: String,
}

impl QuestionTools {
    pub fn new(
        client: Option<Arc<dyn SheetStore>>,
        spreadsheet_id: Option<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            spreadsheet_id: spreadsheet_id.filter(|id| !id.trim().is_empty()),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some() && self.spreadsheet_id.is_some()
    }

    fn ledger(&self) -> Result<QuestionLedger<'_>, ToolError> {
        let client = self
            .client
            .as_deref()
            .ok_or_else(|| ToolError::NotConfigured(NOT_CONFIGURED.to_string()))?;
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| ToolError::NotConfigured(SPREADSHEET_ID_MISSING.to_string()))?;
        Ok(QuestionLedger::new(client, spreadsheet_id, &self.sheet_name))
    }

    fn list_questions(&self, ledger: &QuestionLedger<'_>) -> Result<ToolResult, ToolError> {
        let snapshot = ledger.snapshot()?;
        if snapshot.empty {
            return Ok(ToolResult::text("No questions found in sheet"));
        }

        let unanswered: Vec<_> = snapshot.unanswered().collect();
        if unanswered.is_empty() {
            return Ok(ToolResult::text("No unanswered questions"));
        }

        let mut output = format!("Found {} unanswered questions:\n", unanswered.len());
        for row in unanswered {
            output.push_str(&format!("\n{}: {}", row.id(), row.question()));
        }

        Ok(ToolResult::text(output))
    }

    fn get_question(
        &self,
        ledger: &QuestionLedger<'_>,
        arguments: Value,
    ) -> Result<ToolResult, ToolError> {
        let args: GetQuestionArgs = parse_args(arguments)?;
        let snapshot = ledger.snapshot()?;

        let Some(row) = snapshot.find(&args.question_id) else {
            return Ok(not_found(&args.question_id));
        };

        Ok(ToolResult::text(format!(
            "Question {}:\n{}\nStatus: {}",
            row.id(),
            row.question(),
            row.status.as_deref().unwrap_or("unknown")
        )))
    }

    fn post_answer(
        &self,
        ledger: &QuestionLedger<'_>,
        arguments: Value,
    ) -> Result<ToolResult, ToolError> {
        let args: PostAnswerArgs = parse_args(arguments)?;

        match ledger.post_answer(&args.question_id, &args.answer, Utc::now())? {
            Some(_) => Ok(ToolResult::text(format!(
                "Answer posted for question {}",
                args.question_id
            ))),
            None => Ok(not_found(&args.question_id)),
        }
    }

    fn update_status(
        &self,
        ledger: &QuestionLedger<'_>,
        arguments: Value,
    ) -> Result<ToolResult, ToolError> {
        let args: UpdateStatusArgs = parse_args(arguments)?;
        // The schema enum is advisory; clients can send anything.
        let status: Status = args.status.parse()?;

        match ledger.update_status(&args.question_id, status)? {
            Some(_) => Ok(ToolResult::text(format!(
                "Status updated to '{}' for question {}",
                status, args.question_id
            ))),
            None => Ok(not_found(&args.question_id)),
        }
    }
}

fn not_found(question_id: &str) -> ToolResult {
    ToolResult::text(format!("Question {} not found", question_id))
}

impl ToolSet for QuestionTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "list_questions".to_string(),
                description: "Get all unanswered questions from the sheet".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            ToolDefinition {
                name: "get_question".to_string(),
                description: "Get a specific question by ID".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "question_id": {
                            "type": "string",
                            "description": "The question ID (e.g., 'Q001')"
                        }
                    },
                    "required": ["question_id"]
                }),
            },
            ToolDefinition {
                name: "post_answer".to_string(),
                description: "Post an answer for a specific question".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "question_id": {
                            "type": "string",
                            "description": "The question ID"
                        },
                        "answer": {
                            "type": "string",
                            "description": "The answer text"
                        }
                    },
                    "required": ["question_id", "answer"]
                }),
            },
            ToolDefinition {
                name: "update_status".to_string(),
                description: "Update the status of a question".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "question_id": {
                            "type": "string",
                            "description": "The question ID"
                        },
                        "status": {
                            "type": "string",
                            "description": "New status (unanswered/answered/reviewed)",
                            "enum": Status::names()
                        }
                    },
                    "required": ["question_id", "status"]
                }),
            },
        ]
    }

    fn call(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolError> {
        match name {
            "list_questions" => self.list_questions(&self.ledger()?),
            "get_question" => self.get_question(&self.ledger()?, arguments),
            "post_answer" => self.post_answer(&self.ledger()?, arguments),
            "update_status" => self.update_status(&self.ledger()?, arguments),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}
