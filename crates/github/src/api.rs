use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub head_sha: String,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowRun {
    pub fn is_cancelled(&self) -> bool { self.conclusion.as_deref() == Some("cancelled") }
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct CheckRunOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CheckRunOutput {
    pub fn is_empty(&self) -> bool {
        self.summary.as_deref().is_none_or(str::is_empty)
            && self.text.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub output: CheckRunOutput,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct NewCheckRun {
    pub name: String,
    pub head_sha: String,
    pub status: String,
    pub conclusion: String,
    pub completed_at: DateTime<Utc>,
    pub output: CheckRunOutput,
}

/// The slice of the GitHub API used by the actions, scoped to a single repository.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn workflow_run(&self, run_id: u64) -> Result<WorkflowRun>;

    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo>;

    /// All comments on the pull request, oldest first, optionally only those created at or
    /// after `since`.
    async fn list_comments(
        &self,
        number: u64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<IssueComment>>;

    async fn create_comment(&self, number: u64, body: &str) -> Result<IssueComment>;

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()>;

    async fn list_check_runs(&self, head_sha: &str) -> Result<Vec<CheckRun>>;

    async fn update_check_run_output(&self, check_run_id: u64, output: &CheckRunOutput)
    -> Result<()>;

    async fn create_check_run(&self, check_run: &NewCheckRun) -> Result<CheckRun>;
}
