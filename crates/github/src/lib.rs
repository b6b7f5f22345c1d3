pub mod api;
pub mod inject;
pub mod locate;
pub mod maintain;

#[cfg(test)]
mod fake;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{
    Octocrab,
    models::{CommentId, issues::Comment},
};
use pr_actions_core::config::GitHubConfig;
use serde::{Deserialize, Serialize};

pub use crate::api::{
    CheckRun, CheckRunOutput, IssueComment, NewCheckRun, PullRequestInfo, RemoteApi, WorkflowRun,
};

/// GitHub client bound to the repository the action runs in.
#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
    pub owner: String,
    pub repo: String,
}

#[derive(Serialize)]
struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
}

#[derive(Deserialize)]
struct CheckRunList {
    total_count: u64,
    check_runs: Vec<CheckRun>,
}

#[derive(Serialize)]
struct UpdateCheckRun<'a> {
    output: &'a CheckRunOutput,
}

impl From<Comment> for IssueComment {
    fn from(value: Comment) -> Self {
        Self {
            id: value.id.into_inner(),
            body: value.body.unwrap_or_default(),
            created_at: value.created_at,
        }
    }
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let (owner, repo) = config.owner_repo()?;
        let mut builder = Octocrab::builder().personal_token(config.token.clone());
        if let Some(api_url) = &config.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .with_context(|| format!("Invalid GitHub API URL {api_url}"))?;
        }
        let client = builder.build().context("Failed to create GitHub client")?;
        tracing::info!("Using repository {}/{}", owner, repo);
        Ok(Self { client, owner: owner.to_string(), repo: repo.to_string() })
    }

    fn route(&self, path: &str) -> String { format!("/repos/{}/{}/{}", self.owner, self.repo, path) }
}

#[async_trait]
impl RemoteApi for GitHub {
    async fn workflow_run(&self, run_id: u64) -> Result<WorkflowRun> {
        self.client
            .get(self.route(&format!("actions/runs/{run_id}")), None::<&()>)
            .await
            .with_context(|| format!("Failed to fetch workflow run {run_id}"))
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo> {
        self.client
            .get(self.route(&format!("pulls/{number}")), None::<&()>)
            .await
            .with_context(|| format!("Failed to fetch pull request #{number}"))
    }

    async fn list_comments(
        &self,
        number: u64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<IssueComment>> {
        let issues = self.client.issues(&self.owner, &self.repo);
        let mut request = issues.list_comments(number).per_page(100);
        if let Some(since) = since {
            request = request.since(since);
        }
        let page = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch comments of pull request #{number}"))?;
        let comments = self
            .client
            .all_pages(page)
            .await
            .with_context(|| format!("Failed to fetch comments of pull request #{number}"))?;
        Ok(comments.into_iter().map(IssueComment::from).collect())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<IssueComment> {
        let comment = self
            .client
            .issues(&self.owner, &self.repo)
            .create_comment(number, body)
            .await
            .with_context(|| format!("Failed to create comment on pull request #{number}"))?;
        Ok(comment.into())
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .update_comment(CommentId(comment_id), body)
            .await
            .with_context(|| format!("Failed to update comment {comment_id}"))?;
        Ok(())
    }

    async fn list_check_runs(&self, head_sha: &str) -> Result<Vec<CheckRun>> {
        let route = self.route(&format!("commits/{head_sha}/check-runs"));
        let mut page = 1;
        let mut response: CheckRunList = self
            .client
            .get(&route, Some(&PageParams { per_page: Some(100), page: Some(page) }))
            .await
            .with_context(|| format!("Failed to fetch check runs for {head_sha}"))?;
        let mut check_runs = response.check_runs;
        while (check_runs.len() as u64) < response.total_count {
            page += 1;
            response = self
                .client
                .get(&route, Some(&PageParams { per_page: Some(100), page: Some(page) }))
                .await
                .with_context(|| format!("Failed to fetch check runs page {page} for {head_sha}"))?;
            if response.check_runs.is_empty() {
                break;
            }
            check_runs.extend(response.check_runs);
        }
        Ok(check_runs)
    }

    async fn update_check_run_output(
        &self,
        check_run_id: u64,
        output: &CheckRunOutput,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .patch(self.route(&format!("check-runs/{check_run_id}")), Some(&UpdateCheckRun {
                output,
            }))
            .await
            .with_context(|| format!("Failed to update check run {check_run_id}"))?;
        Ok(())
    }

    async fn create_check_run(&self, check_run: &NewCheckRun) -> Result<CheckRun> {
        self.client
            .post(self.route("check-runs"), Some(check_run))
            .await
            .with_context(|| format!("Failed to create check run '{}'", check_run.name))
    }
}
