//! In-memory [`RemoteApi`] for tests.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::api::{
    CheckRun, CheckRunOutput, IssueComment, NewCheckRun, PullRequestInfo, RemoteApi, WorkflowRun,
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    WorkflowRun(u64),
    PullRequest(u64),
    ListComments(u64, Option<DateTime<Utc>>),
    CreateComment(u64),
    UpdateComment(u64),
    ListCheckRuns(String),
    UpdateCheckRun(u64),
    CreateCheckRun(String),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::CreateComment(_)
                | Self::UpdateComment(_)
                | Self::UpdateCheckRun(_)
                | Self::CreateCheckRun(_)
        )
    }
}

#[derive(Default)]
pub struct FakeState {
    pub workflow_run: Option<WorkflowRun>,
    pub pull_requests: Vec<u64>,
    pub comments: Vec<IssueComment>,
    /// Comments stay hidden until this many listings have been made.
    pub comments_visible_after: usize,
    pub check_runs: Vec<CheckRun>,
    pub created_check_runs: Vec<NewCheckRun>,
    pub fail_list_comments: bool,
    pub fail_list_check_runs: bool,
    pub fail_create_check_run: bool,
    pub calls: Vec<Call>,
    list_comment_calls: usize,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeState>,
}

pub fn timestamp(minutes: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
}

pub fn comment(id: u64, body: &str, minutes: i64) -> IssueComment {
    IssueComment { id, body: body.to_string(), created_at: timestamp(minutes) }
}

impl FakeRemote {
    pub fn new(setup: impl FnOnce(&mut FakeState)) -> Self {
        let mut state = FakeState { next_id: 1000, ..Default::default() };
        setup(&mut state);
        Self { state: Mutex::new(state) }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> { self.state.lock().unwrap() }

    pub fn calls(&self) -> Vec<Call> { self.state().calls.clone() }

    pub fn writes(&self) -> Vec<Call> { self.calls().into_iter().filter(Call::is_write).collect() }

    pub fn comment_body(&self, id: u64) -> Option<String> {
        self.state().comments.iter().find(|c| c.id == id).map(|c| c.body.clone())
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn workflow_run(&self, run_id: u64) -> Result<WorkflowRun> {
        let mut state = self.state();
        state.calls.push(Call::WorkflowRun(run_id));
        state
            .workflow_run
            .clone()
            .filter(|run| run.id == run_id)
            .ok_or_else(|| anyhow!("Not Found: workflow run {run_id}"))
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo> {
        let mut state = self.state();
        state.calls.push(Call::PullRequest(number));
        if !state.pull_requests.contains(&number) {
            bail!("Not Found: pull request {number}");
        }
        Ok(PullRequestInfo { number })
    }

    async fn list_comments(
        &self,
        number: u64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<IssueComment>> {
        let mut state = self.state();
        state.calls.push(Call::ListComments(number, since));
        if state.fail_list_comments {
            bail!("Server Error");
        }
        state.list_comment_calls += 1;
        if state.list_comment_calls <= state.comments_visible_after {
            return Ok(vec![]);
        }
        Ok(state
            .comments
            .iter()
            .filter(|c| since.is_none_or(|since| c.created_at >= since))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<IssueComment> {
        let mut state = self.state();
        state.calls.push(Call::CreateComment(number));
        state.next_id += 1;
        let comment =
            IssueComment { id: state.next_id, body: body.to_string(), created_at: timestamp(60) };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::UpdateComment(comment_id));
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| anyhow!("Not Found: comment {comment_id}"))?;
        comment.body = body.to_string();
        Ok(())
    }

    async fn list_check_runs(&self, head_sha: &str) -> Result<Vec<CheckRun>> {
        let mut state = self.state();
        state.calls.push(Call::ListCheckRuns(head_sha.to_string()));
        if state.fail_list_check_runs {
            bail!("Server Error");
        }
        Ok(state.check_runs.clone())
    }

    async fn update_check_run_output(
        &self,
        check_run_id: u64,
        output: &CheckRunOutput,
    ) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::UpdateCheckRun(check_run_id));
        let check_run = state
            .check_runs
            .iter_mut()
            .find(|c| c.id == check_run_id)
            .ok_or_else(|| anyhow!("Not Found: check run {check_run_id}"))?;
        check_run.output = output.clone();
        Ok(())
    }

    async fn create_check_run(&self, check_run: &NewCheckRun) -> Result<CheckRun> {
        let mut state = self.state();
        state.calls.push(Call::CreateCheckRun(check_run.name.clone()));
        if state.fail_create_check_run {
            bail!("Resource not accessible by integration");
        }
        state.next_id += 1;
        state.created_check_runs.push(check_run.clone());
        Ok(CheckRun {
            id: state.next_id,
            name: check_run.name.clone(),
            output: check_run.output.clone(),
        })
    }
}
