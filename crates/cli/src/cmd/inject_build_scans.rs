use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use argp::FromArgs;
use pr_actions_core::config::{GitHubConfig, InjectConfig};
use pr_actions_github::{
    GitHub,
    inject::{
        InjectOutcome, InjectSettings, inject_build_scans, read_status_file, required_inputs,
    },
};

use crate::util::{native_path, parse_input};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Attach build scan links to the pull request report of a workflow run.
#[argp(subcommand, name = "inject-build-scans")]
pub struct Args {
    #[argp(option)]
    /// workflow run ID (defaults to the workflow-run-id input)
    workflow_run_id: Option<u64>,
    #[argp(option, short = 's', from_str_fn(native_path))]
    /// build status file (defaults to build-metadata.json)
    status_file: Option<PathBuf>,
    #[argp(option, short = 'c', from_str_fn(native_path))]
    /// YAML configuration file
    config: Option<PathBuf>,
}

pub async fn run(args: Args) -> Result<ExitCode> {
    let mut config = InjectConfig::load(args.config.as_deref())?;
    if let Some(status_file) = args.status_file {
        config.status_file = status_file;
    }
    let status_data = read_status_file(&config.status_file).await;
    // Inputs and credentials are only needed once there is something to attach
    let run_id = match (&status_data, args.workflow_run_id) {
        (None, _) => None,
        (Some(_), Some(run_id)) => Some(run_id),
        (Some(_), None) => parse_input::<u64>("workflow-run-id")?,
    };
    let outcome = match required_inputs(status_data.as_deref(), run_id) {
        Err(reason) => {
            tracing::warn!("{}", reason);
            InjectOutcome::Skipped(reason)
        }
        Ok(_) => {
            let github = GitHub::new(&GitHubConfig::from_env()?)?;
            let settings = InjectSettings::from(&config);
            inject_build_scans(&github, status_data.as_deref(), run_id, &settings).await?
        }
    };
    for annotation in outcome.annotations() {
        println!("{annotation}");
    }
    if let InjectOutcome::Completed(report) = &outcome {
        tracing::info!(
            "Comment: {:?}, check run: {:?}, summary: {:?}",
            report.comment,
            report.check_run,
            report.summary
        );
    }
    Ok(ExitCode::SUCCESS)
}
