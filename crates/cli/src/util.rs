use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use pr_actions_core::config::input;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<PathBuf, String> { Ok(PathBuf::from(value)) }

/// Reads an optional action input and parses it.
pub fn parse_input<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    input(name)
        .map(|value| {
            value.trim().parse::<T>().with_context(|| format!("Invalid {name} input '{value}'"))
        })
        .transpose()
}
