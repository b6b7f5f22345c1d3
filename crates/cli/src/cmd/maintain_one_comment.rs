use std::process::ExitCode;

use anyhow::{Context, Result};
use argp::FromArgs;
use pr_actions_core::config::{GitHubConfig, input};
use pr_actions_github::{
    GitHub,
    maintain::{MaintainOutcome, maintain_one_comment},
};

use crate::util::parse_input;

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Create or update the single pull request comment tagged with a marker.
#[argp(subcommand, name = "maintain-one-comment")]
pub struct Args {
    #[argp(option)]
    /// comment body (defaults to the body input)
    body: Option<String>,
    #[argp(option)]
    /// marker identifying the comment (defaults to the body-marker input)
    body_marker: Option<String>,
    #[argp(option)]
    /// pull request number (defaults to the pr-number input)
    pr_number: Option<u64>,
}

pub async fn run(args: Args) -> Result<ExitCode> {
    let body =
        args.body.or_else(|| input("body")).context("Input required and not supplied: body")?;
    let marker = args
        .body_marker
        .or_else(|| input("body-marker"))
        .context("Input required and not supplied: body-marker")?;
    let number = match args.pr_number {
        Some(number) => number,
        None => parse_input::<u64>("pr-number")?
            .context("Input required and not supplied: pr-number")?,
    };
    let github = GitHub::new(&GitHubConfig::from_env()?)?;

    match maintain_one_comment(&github, number, &body, &marker).await? {
        MaintainOutcome::Created { comment_id } => {
            tracing::info!("Created comment {}", comment_id)
        }
        MaintainOutcome::Updated { comment_id } => {
            tracing::info!("Updated comment {}", comment_id)
        }
    }
    Ok(ExitCode::SUCCESS)
}
