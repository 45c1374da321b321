//! Spreadsheet Values Client
//!
//! Reads a named table from the Google Sheets values API and converts the
//! rectangular string rows into JSON records keyed by the header row.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Sheets error types
#[derive(Error, Debug)]
pub enum SheetsError {
    /// The values API is unavailable or returned a malformed response
    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// The requested range exists but holds no rows
    #[error("No data returned for table '{0}'")]
    NoData(String),
}

pub type Result<T> = std::result::Result<T, SheetsError>;

/// Values API response body. Google omits `values` entirely for empty ranges.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<String>>>,
}

/// Client for the spreadsheet values endpoint.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    api_base: String,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(api_base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_base: api_base.into(),
            client,
        }
    }

    /// Fetch all rows of a table, header row included.
    ///
    /// Reads the `{table}!A:Z` range with the given bearer token. The first
    /// row of the result is the header row.
    pub async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        table: &str,
        access_token: &str,
    ) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}!A:Z",
            self.api_base, spreadsheet_id, table
        );

        debug!(%table, "Fetching spreadsheet values");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SheetsError::UpstreamFetch(format!("values API unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%table, %status, "Values API rejected the request");
            return Err(SheetsError::UpstreamFetch(format!(
                "values API returned {}: {}",
                status, body
            )));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::UpstreamFetch(format!("malformed values response: {}", e)))?;

        match range.values {
            Some(values) if !values.is_empty() => Ok(values),
            _ => Err(SheetsError::NoData(table.to_string())),
        }
    }
}

/// Convert rows into JSON records by zipping the header row with each data row.
///
/// Missing trailing cells become empty strings; fewer than two rows yield an
/// empty record list (a header alone carries no data).
pub fn rows_to_records(rows: &[Vec<String>]) -> Vec<serde_json::Value> {
    if rows.len() < 2 {
        return Vec::new();
    }

    let headers = &rows[0];
    rows[1..]
        .iter()
        .map(|row| {
            let mut record = serde_json::Map::with_capacity(headers.len());
            for (index, header) in headers.iter().enumerate() {
                let cell = row.get(index).cloned().unwrap_or_default();
                record.insert(header.clone(), serde_json::Value::String(cell));
            }
            serde_json::Value::Object(record)
        })
        .collect()
}
