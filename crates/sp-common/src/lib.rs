//! Shared types for the SheetPress publishing service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod logging;

// ============================================================================
// Table Registry Types
// ============================================================================

/// How often a table is expected to be refreshed by the publishing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPriority {
    Daily,
    Weekly,
}

/// Minimum editorial role required to maintain a table's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TableRole {
    Editor,
    Admin,
}

/// A published table as exposed by the config endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TableDescriptor {
    pub name: String,
    pub priority: RefreshPriority,
    pub role_required: TableRole,
    pub active: bool,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, priority: RefreshPriority, role_required: TableRole) -> Self {
        Self {
            name: name.into(),
            priority,
            role_required,
            active: true,
        }
    }
}

// ============================================================================
// Caller Roles
// ============================================================================

/// Capability granted to a caller after token comparison.
///
/// Admin implies viewer: the admin token can exercise every operation,
/// the viewer token only the read-only ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Admin,
}

impl Role {
    pub fn can_view(&self) -> bool {
        matches!(self, Role::Viewer | Role::Admin)
    }

    pub fn can_publish(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// ============================================================================
// Publish Result Types
// ============================================================================

/// Outcome status for a single table publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Success,
    Error,
}

/// Result of publishing a single table.
///
/// A failed table carries an error message instead of a row count. Batch
/// processing collects one of these per table and never lets one table's
/// failure abort its siblings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TablePublishResult {
    pub table: String,
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TablePublishResult {
    pub fn success(table: impl Into<String>, rows: usize) -> Self {
        Self {
            table: table.into(),
            status: PublishStatus::Success,
            rows: Some(rows),
            message: None,
        }
    }

    pub fn failure(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            status: PublishStatus::Error,
            rows: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PublishStatus::Success
    }
}

/// Aggregate report for a batch publish across all configured tables.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchPublishReport {
    pub published: usize,
    pub failed: usize,
    pub results: Vec<TablePublishResult>,
}

impl BatchPublishReport {
    pub fn from_results(results: Vec<TablePublishResult>) -> Self {
        let published = results.iter().filter(|r| r.is_success()).count();
        let failed = results.len() - published;
        Self {
            published,
            failed,
            results,
        }
    }
}
