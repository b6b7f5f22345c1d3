//! Attaching build scan links to the report of a completed workflow run.
//!
//! The report comment and check run are produced by another process, so both are located by
//! content and only rewritten when patching actually changes them. A fresh summary check run
//! listing every build scan is created on each invocation.

use std::{fmt, path::Path};

use anyhow::{Context, Result};
use chrono::Utc;
use pr_actions_core::{
    commands::format_command, config::InjectConfig, models::BuildStatuses, patch::patch_body,
    summary::generate_scan_table, workflow_run_marker,
};

use crate::{
    api::{CheckRunOutput, NewCheckRun, RemoteApi, WorkflowRun},
    locate::{PollPolicy, find_check_run, find_comment},
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InjectSettings {
    pub marker_tool_id: String,
    pub check_run_title_prefix: String,
    pub summary_name: String,
    pub poll: PollPolicy,
}

impl From<&InjectConfig> for InjectSettings {
    fn from(config: &InjectConfig) -> Self {
        Self {
            marker_tool_id: config.marker_tool_id.clone(),
            check_run_title_prefix: config.check_run_title_prefix.clone(),
            summary_name: config.summary_name.clone(),
            poll: PollPolicy::from(&config.poll),
        }
    }
}

impl Default for InjectSettings {
    fn default() -> Self { Self::from(&InjectConfig::default()) }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SkipReason {
    StatusFileUnavailable,
    MissingRunId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StatusFileUnavailable => "Build status file is not readable, ignoring",
            Self::MissingRunId => "No workflow run id provided, ignoring",
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StepOutcome {
    Updated,
    Unchanged,
    NotFound,
    Created,
    Failed(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InjectReport {
    pub comment: StepOutcome,
    pub check_run: StepOutcome,
    pub summary: StepOutcome,
    pub warnings: Vec<String>,
    /// Reported as error annotations, the invocation still succeeds.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InjectOutcome {
    Skipped(SkipReason),
    /// The workflow run was cancelled, nothing was written.
    Cancelled,
    Completed(InjectReport),
}

impl InjectOutcome {
    /// Workflow commands surfacing skips, warnings and step errors in the run log.
    pub fn annotations(&self) -> Vec<String> {
        match self {
            Self::Skipped(reason) => vec![format_command("warning", reason)],
            Self::Cancelled => vec![],
            Self::Completed(report) => report
                .warnings
                .iter()
                .map(|warning| format_command("warning", warning))
                .chain(report.errors.iter().map(|error| format_command("error", error)))
                .collect(),
        }
    }
}

/// Both inputs needed to do any work. The status file is checked before the run id.
pub fn required_inputs(
    status_data: Option<&[u8]>,
    run_id: Option<u64>,
) -> Result<(&[u8], u64), SkipReason> {
    let status_data = status_data.ok_or(SkipReason::StatusFileUnavailable)?;
    let run_id = run_id.ok_or(SkipReason::MissingRunId)?;
    Ok((status_data, run_id))
}

/// Reads the build status file. A missing or unreadable file is an expected condition.
pub async fn read_status_file(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!("{} is not readable: {}", path.display(), e);
            None
        }
    }
}

pub async fn inject_build_scans(
    api: &dyn RemoteApi,
    status_data: Option<&[u8]>,
    run_id: Option<u64>,
    settings: &InjectSettings,
) -> Result<InjectOutcome> {
    let (status_data, run_id) = match required_inputs(status_data, run_id) {
        Ok(inputs) => inputs,
        Err(reason) => {
            tracing::warn!("{}", reason);
            return Ok(InjectOutcome::Skipped(reason));
        }
    };
    let statuses = BuildStatuses::parse(status_data).context("Unable to parse build status file")?;

    let pull_request = api.pull_request(statuses.pr_number).await.with_context(|| {
        format!("Error trying to attach build scans to pull request #{}", statuses.pr_number)
    })?;
    let run = api.workflow_run(run_id).await.with_context(|| {
        format!("Error trying to attach build scans to pull request #{}", statuses.pr_number)
    })?;
    if run.is_cancelled() {
        tracing::info!("Workflow run {} was cancelled, skipping", run.id);
        return Ok(InjectOutcome::Cancelled);
    }
    tracing::info!(
        "Attaching {} build scans to pull request #{} (workflow run {}, {})",
        statuses.builds().len(),
        pull_request.number,
        run.id,
        run.head_sha
    );

    let scan_links = statuses.scan_links();
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let comment =
        match update_report_comment(api, &run, pull_request.number, &scan_links, settings).await {
            Ok(StepOutcome::NotFound) => {
                push_warning(&mut warnings, "Unable to find a report comment to update");
                StepOutcome::NotFound
            }
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Unable to update the pull request comment: {e:#}");
                push_warning(&mut warnings, &message);
                StepOutcome::Failed(message)
            }
        };

    let check_run = match update_report_check_run(api, &run, &scan_links, settings).await {
        Ok(StepOutcome::NotFound) => {
            push_warning(&mut warnings, "Unable to find a report check run to update");
            StepOutcome::NotFound
        }
        Ok(outcome) => outcome,
        Err(e) => {
            let message = format!("Unable to update the report check run: {e:#}");
            push_warning(&mut warnings, &message);
            StepOutcome::Failed(message)
        }
    };

    let summary = match create_summary_check_run(api, &run, &statuses, settings).await {
        Ok(()) => StepOutcome::Created,
        Err(e) => {
            let message = format!("Unable to create a check run with build scans: {e:#}");
            tracing::error!("{}", message);
            errors.push(message.clone());
            StepOutcome::Failed(message)
        }
    };

    Ok(InjectOutcome::Completed(InjectReport { comment, check_run, summary, warnings, errors }))
}

fn push_warning(warnings: &mut Vec<String>, message: &str) {
    tracing::warn!("{}", message);
    warnings.push(message.to_string());
}

async fn update_report_comment(
    api: &dyn RemoteApi,
    run: &WorkflowRun,
    number: u64,
    scan_links: &[(&str, &str)],
    settings: &InjectSettings,
) -> Result<StepOutcome> {
    let marker = workflow_run_marker(&settings.marker_tool_id, run.id);
    let Some(comment) = find_comment(api, number, run.created_at, &marker, &settings.poll).await?
    else {
        return Ok(StepOutcome::NotFound);
    };
    let patched = patch_body(&comment.body, scan_links);
    if !patched.changed {
        tracing::info!("Report comment {} is already up to date", comment.id);
        return Ok(StepOutcome::Unchanged);
    }
    api.update_comment(comment.id, &patched.body).await?;
    tracing::info!("Updated report comment {}", comment.id);
    Ok(StepOutcome::Updated)
}

async fn update_report_check_run(
    api: &dyn RemoteApi,
    run: &WorkflowRun,
    scan_links: &[(&str, &str)],
    settings: &InjectSettings,
) -> Result<StepOutcome> {
    let Some(check_run) =
        find_check_run(api, &run.head_sha, &settings.check_run_title_prefix).await?
    else {
        return Ok(StepOutcome::NotFound);
    };
    let mut output = check_run.output;
    let mut changed = false;
    for field in [&mut output.summary, &mut output.text] {
        if let Some(value) = field {
            let patched = patch_body(value, scan_links);
            if patched.changed {
                *value = patched.body;
                changed = true;
            }
        }
    }
    if !changed {
        tracing::info!("Report check run {} is already up to date", check_run.id);
        return Ok(StepOutcome::Unchanged);
    }
    api.update_check_run_output(check_run.id, &output).await?;
    tracing::info!("Updated report check run {}", check_run.id);
    Ok(StepOutcome::Updated)
}

async fn create_summary_check_run(
    api: &dyn RemoteApi,
    run: &WorkflowRun,
    statuses: &BuildStatuses,
    settings: &InjectSettings,
) -> Result<()> {
    let name = settings.summary_name.clone();
    let check_run = api
        .create_check_run(&NewCheckRun {
            name: name.clone(),
            head_sha: run.head_sha.clone(),
            status: "completed".to_string(),
            conclusion: "neutral".to_string(),
            completed_at: Utc::now(),
            output: CheckRunOutput {
                title: Some(name.clone()),
                summary: Some(name),
                text: Some(generate_scan_table(statuses)),
            },
        })
        .await?;
    tracing::info!("Created check run {} ({})", check_run.id, check_run.name);
    Ok(())
}
