mod cmd;
mod util;

use std::process::ExitCode;

use argp::FromArgs;
use pr_actions_core::commands;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(FromArgs, PartialEq, Debug)]
/// GitHub Actions helpers for pull request build reports.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    InjectBuildScans(cmd::inject_build_scans::Args),
    MaintainOneComment(cmd::maintain_one_comment::Args),
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    // stdout is reserved for workflow commands
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let result = match args.command {
        SubCommand::InjectBuildScans(args) => cmd::inject_build_scans::run(args).await,
        SubCommand::MaintainOneComment(args) => cmd::maintain_one_comment::run(args).await,
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:?}", e);
            commands::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
