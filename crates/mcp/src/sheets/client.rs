use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use toolhost_core::{CellRange, SheetError, SheetStore};
use tracing::debug;

use super::auth::{ServiceAccountKey, TokenSource};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const USER_AGENT: &str = "toolhost-mcp/0.1 (https://github.com/Hydepwns/toolhost)";

/// `SheetStore` backed by the hosted Sheets REST API.
pub struct SheetsClient {
    client: Client,
    tokens: TokenSource,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: String,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey) -> Result<Self, SheetError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(key, client)
    }

    fn with_http_client(key: ServiceAccountKey, client: Client) -> Result<Self, SheetError> {
        let tokens = TokenSource::new(key, client.clone())?;

        Ok(Self {
            client,
            tokens,
            base_url: SHEETS_API.to_string(),
        })
    }

    pub fn from_credentials(path: &Path) -> anyhow::Result<Self> {
        let key = ServiceAccountKey::load(path)?;
        Ok(Self::new(key)?)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn service_account(&self) -> &str {
        self.tokens.client_email()
    }

    fn values_url(&self, spreadsheet_id: &str, range: &CellRange) -> String {
        values_url(&self.base_url, spreadsheet_id, range)
    }
}

fn values_url(base_url: &str, spreadsheet_id: &str, range: &CellRange) -> String {
    format!(
        "{}/{}/values/{}",
        base_url,
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(&range.to_string())
    )
}

fn check(response: Response) -> Result<Response, SheetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(SheetError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_values(range: ValueRange) -> Vec<Vec<String>> {
    range
        .values
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

impl SheetStore for SheetsClient {
    fn get_range(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let token = self.tokens.access_token()?;
        debug!(%range, "reading sheet range");

        let response = self
            .client
            .get(self.values_url(spreadsheet_id, range))
            .bearer_auth(token)
            .send()
            .map_err(|e| SheetError::Transport(e.to_string()))?;

        let data: ValueRange = check(response)?
            .json()
            .map_err(|e| SheetError::Decode(e.to_string()))?;

        Ok(decode_values(data))
    }

    fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let token = self.tokens.access_token()?;
        debug!(%range, rows = values.len(), "writing sheet range");

        let body = ValueRangeBody {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: &values,
        };

        let response = self
            .client
            .put(self.values_url(spreadsheet_id, range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .map_err(|e| SheetError::Transport(e.to_string()))?;

        check(response)?;
        Ok(())
    }
}
