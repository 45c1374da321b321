use serde::{Deserialize, Serialize};
use sp_common::TablePublishResult;
use utoipa::ToSchema;

/// Simple health response
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleHealthResponse {
    /// Health status: UP
    pub status: String,
    /// Application version
    pub version: String,
}

/// Query parameters accepted by every authenticated endpoint
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AuthQuery {
    /// Caller secret, compared by equality against the configured tokens
    pub token: Option<String>,
}

/// Query parameters for single-table publish
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishQuery {
    /// Caller secret
    pub token: Option<String>,
    /// Table to publish
    pub table: Option<String>,
}

/// Response after publishing a single table
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishOneResponse {
    /// Whether the publish succeeded
    pub success: bool,
    /// Table name
    pub table: String,
    /// Rows published (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Failure description (on error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<TablePublishResult> for PublishOneResponse {
    fn from(result: TablePublishResult) -> Self {
        Self {
            success: result.is_success(),
            table: result.table.clone(),
            rows: result.rows,
            message: result.message,
        }
    }
}

/// Response after a batch publish across all active tables
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishAllResponse {
    /// Always true: the batch itself completed even if tables failed
    pub success: bool,
    /// Number of tables published
    pub published: usize,
    /// Number of tables that failed
    pub failed: usize,
    /// Per-table results in registry order
    pub results: Vec<TablePublishResult>,
}

/// Structured error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error kind
    pub error: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
