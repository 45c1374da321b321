//! GitHub Contents Client
//!
//! Commits generated files to a repository through the contents API.
//! An upsert is two steps: read the current file metadata to learn the
//! existing blob SHA (absent for new files), then PUT the new content with
//! the SHA included only when updating.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// GitHub error types
#[derive(Error, Debug)]
pub enum GitHubError {
    /// The contents API could not be reached
    #[error("GitHub API unreachable: {0}")]
    Unreachable(String),

    /// The commit was rejected or the metadata read failed
    #[error("Publish error: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Whether an upsert created a new file or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Target repository coordinates.
#[derive(Debug, Clone)]
pub struct GitHubTarget {
    /// "owner/name"
    pub repo: String,
    pub branch: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct ContentsMetadata {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Client for the repository contents API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_base: String,
    target: GitHubTarget,
    client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(api_base: impl Into<String>, target: GitHubTarget, client: reqwest::Client) -> Self {
        Self {
            api_base: api_base.into(),
            target,
            client,
        }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base, self.target.repo, path
        )
    }

    /// Read the current blob SHA of a file, or None when the file does not
    /// exist on the target branch.
    pub async fn current_sha(&self, path: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.target.branch.as_str())])
            .header("Authorization", format!("token {}", self.target.token))
            .header("User-Agent", "sheetpress")
            .send()
            .await
            .map_err(|e| GitHubError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Publish(format!(
                "metadata read returned {}: {}",
                status, body
            )));
        }

        let metadata: ContentsMetadata = response
            .json()
            .await
            .map_err(|e| GitHubError::Publish(format!("malformed metadata response: {}", e)))?;
        Ok(Some(metadata.sha))
    }

    /// Create or update a file in one atomic commit.
    pub async fn upsert_file(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<UpsertOutcome> {
        let sha = self.current_sha(path).await?;
        let outcome = if sha.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        };

        debug!(%path, updating = sha.is_some(), "Committing file to repository");

        let request = CommitRequest {
            message: commit_message,
            content: BASE64.encode(content.as_bytes()),
            branch: &self.target.branch,
            sha,
        };

        let response = self
            .client
            .put(self.contents_url(path))
            .header("Authorization", format!("token {}", self.target.token))
            .header("User-Agent", "sheetpress")
            .json(&request)
            .send()
            .await
            .map_err(|e| GitHubError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%path, %status, "Commit rejected");
            return Err(GitHubError::Publish(format!(
                "commit returned {}: {}",
                status, body
            )));
        }

        Ok(outcome)
    }
}
