//! Table Publish Orchestration
//!
//! Runs the per-table pipeline: obtain an access token, fetch the table
//! rows, transform them into JSON records, and commit the result as
//! `{table}.json`. Batch publishing runs tables concurrently and collects
//! one result per table; a failing table never aborts its siblings.
//!
//! The sheet source and content publisher sit behind traits so tests can
//! inject fixtures without any network.

use async_trait::async_trait;
use futures::future::join_all;
use sp_common::{BatchPublishReport, TablePublishResult};
use sp_gauth::ServiceAccountAuthenticator;
use sp_github::GitHubClient;
use sp_sheets::{rows_to_records, SheetsClient};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Publish pipeline error types
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Auth(#[from] sp_gauth::AuthError),

    #[error(transparent)]
    Sheets(#[from] sp_sheets::SheetsError),

    #[error(transparent)]
    GitHub(#[from] sp_github::GitHubError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Source of tabular rows, header row first.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Vec<String>>, PublishError>;
}

/// Destination for generated files.
#[async_trait]
pub trait ContentPublisher: Send + Sync {
    async fn publish_file(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<(), PublishError>;
}

/// Live sheet source: a fresh access token per fetch, then the values API.
///
/// Tokens are deliberately not cached; publishes are low-frequency admin
/// operations and each pipeline must hold a valid, unexpired token.
pub struct LiveSheetSource {
    authenticator: ServiceAccountAuthenticator,
    sheets: SheetsClient,
    spreadsheet_id: String,
}

impl LiveSheetSource {
    pub fn new(
        authenticator: ServiceAccountAuthenticator,
        sheets: SheetsClient,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            authenticator,
            sheets,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}

#[async_trait]
impl SheetSource for LiveSheetSource {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Vec<String>>, PublishError> {
        let token = self.authenticator.fetch_access_token().await?;
        let rows = self
            .sheets
            .fetch_values(&self.spreadsheet_id, table, &token)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ContentPublisher for GitHubClient {
    async fn publish_file(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<(), PublishError> {
        self.upsert_file(path, content, commit_message).await?;
        Ok(())
    }
}

/// Drives the fetch-transform-commit pipeline for one or many tables.
pub struct TablePublisher {
    source: Arc<dyn SheetSource>,
    publisher: Arc<dyn ContentPublisher>,
}

impl TablePublisher {
    pub fn new(source: Arc<dyn SheetSource>, publisher: Arc<dyn ContentPublisher>) -> Self {
        Self { source, publisher }
    }

    /// Publish a single table; errors become a structured failure result.
    pub async fn publish_table(&self, table: &str) -> TablePublishResult {
        let message = format!("Update {}.json from admin panel", table);
        match self.run_pipeline(table, &message).await {
            Ok(rows) => {
                info!(%table, rows, "Table published");
                TablePublishResult::success(table, rows)
            }
            Err(e) => {
                warn!(%table, error = %e, "Table publish failed");
                TablePublishResult::failure(table, e.to_string())
            }
        }
    }

    /// Publish every listed table concurrently and aggregate the results.
    ///
    /// Each table runs its own independent pipeline with its own token;
    /// results come back in input order.
    pub async fn publish_all(&self, tables: &[String]) -> BatchPublishReport {
        let pipelines = tables.iter().map(|table| async move {
            let message = format!("Update {}.json - batch publish", table);
            match self.run_pipeline(table, &message).await {
                Ok(rows) => {
                    info!(%table, rows, "Table published");
                    TablePublishResult::success(table.clone(), rows)
                }
                Err(e) => {
                    warn!(%table, error = %e, "Table publish failed");
                    TablePublishResult::failure(table.clone(), e.to_string())
                }
            }
        });

        let results = join_all(pipelines).await;
        let report = BatchPublishReport::from_results(results);
        info!(
            published = report.published,
            failed = report.failed,
            "Batch publish complete"
        );
        report
    }

    /// One table's pipeline: fetch rows, build records, commit JSON.
    async fn run_pipeline(&self, table: &str, commit_message: &str) -> Result<usize, PublishError> {
        let rows = self.source.fetch_table(table).await?;
        let records = rows_to_records(&rows);
        let content = serde_json::to_string_pretty(&records)?;

        self.publisher
            .publish_file(&format!("{}.json", table), &content, commit_message)
            .await?;

        Ok(records.len())
    }
}
