//! Finding the remote resources created for a workflow run by other writers.

use std::{future::Future, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use pr_actions_core::config::PollConfig;
use tokio::time::sleep;

use crate::api::{CheckRun, IssueComment, RemoteApi};

/// Bounded polling: wait `initial_delay`, then check up to `max_attempts` times with
/// `interval` between checks.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Policy that checks as many times as fit within `timeout`. Always checks at least once.
    pub fn new(initial_delay: Duration, interval: Duration, timeout: Duration) -> Self {
        let remaining = timeout.saturating_sub(initial_delay);
        let extra_attempts = if interval.is_zero() {
            0
        } else {
            u32::try_from(remaining.as_nanos() / interval.as_nanos()).unwrap_or(u32::MAX)
        };
        Self { initial_delay, interval, max_attempts: extra_attempts.saturating_add(1) }
    }

    /// Check once, without waiting.
    pub const fn immediate() -> Self {
        Self { initial_delay: Duration::ZERO, interval: Duration::ZERO, max_attempts: 1 }
    }

    /// Runs `check` until it yields a value or the attempts are exhausted.
    /// Errors from `check` end the polling immediately.
    pub async fn poll<T, F, Fut>(&self, mut check: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        sleep(self.initial_delay).await;
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                sleep(self.interval).await;
            }
            if let Some(value) = check().await? {
                return Ok(Some(value));
            }
            tracing::debug!("Nothing found yet (attempt {}/{})", attempt, self.max_attempts);
        }
        Ok(None)
    }
}

impl Default for PollPolicy {
    fn default() -> Self { Self::from(&PollConfig::default()) }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self::new(
            Duration::from_secs(config.initial_delay_secs),
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

/// The most recent comment containing `marker`.
pub fn find_marked_comment<'a>(
    comments: &'a [IssueComment],
    marker: &str,
) -> Option<&'a IssueComment> {
    comments.iter().rev().find(|comment| comment.body.contains(marker))
}

/// Waits for a comment containing `marker`, created at or after `since`, to show up on the
/// pull request. Returns `None` once the policy is exhausted.
pub async fn find_comment(
    api: &dyn RemoteApi,
    number: u64,
    since: DateTime<Utc>,
    marker: &str,
    policy: &PollPolicy,
) -> Result<Option<IssueComment>> {
    policy
        .poll(|| async move {
            let comments = api.list_comments(number, Some(since)).await?;
            Ok(find_marked_comment(&comments, marker).cloned())
        })
        .await
}

/// A check run on the commit with a non-empty output titled `title_prefix...`.
pub async fn find_check_run(
    api: &dyn RemoteApi,
    head_sha: &str,
    title_prefix: &str,
) -> Result<Option<CheckRun>> {
    let check_runs = api.list_check_runs(head_sha).await?;
    Ok(check_runs.into_iter().find(|check_run| {
        !check_run.output.is_empty()
            && check_run.output.title.as_deref().is_some_and(|title| title.starts_with(title_prefix))
    }))
}
