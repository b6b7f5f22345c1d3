use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    pub token: String,
    /// `owner/name`
    pub repository: String,
    pub api_url: Option<String>,
}

impl GitHubConfig {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = input_from(&lookup, "github-token")
            .or_else(|| non_empty(lookup("GITHUB_TOKEN")))
            .context("No GitHub token provided (github-token input or GITHUB_TOKEN)")?;
        let repository =
            non_empty(lookup("GITHUB_REPOSITORY")).context("GITHUB_REPOSITORY is not set")?;
        let api_url = non_empty(lookup("GITHUB_API_URL"));
        let config = Self { token, repository, api_url };
        config.owner_repo()?;
        Ok(config)
    }

    pub fn owner_repo(&self) -> Result<(&str, &str)> {
        match self.repository.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok((owner, repo))
            }
            _ => Err(anyhow!("Invalid repository '{}', expected owner/name", self.repository)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InjectConfig {
    pub status_file: PathBuf,
    pub marker_tool_id: String,
    pub check_run_title_prefix: String,
    pub summary_name: String,
    pub poll: PollConfig,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            status_file: PathBuf::from("build-metadata.json"),
            marker_tool_id: "Quarkus-GitHub-Bot".to_string(),
            check_run_title_prefix: "Build summary for ".to_string(),
            summary_name: "Build scans".to_string(),
            poll: PollConfig::default(),
        }
    }
}

impl InjectConfig {
    /// Loads the YAML configuration file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// How long to wait for the report comment to show up.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self { Self { initial_delay_secs: 120, interval_secs: 180, timeout_secs: 900 } }
}

fn non_empty(value: Option<String>) -> Option<String> { value.filter(|v| !v.is_empty()) }

/// Reads an action input from the `INPUT_<NAME>` environment variable.
pub fn input(name: &str) -> Option<String> { input_from(|key| std::env::var(key).ok(), name) }

pub fn input_from(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    non_empty(lookup(&format!("INPUT_{}", name.replace(' ', "_").to_uppercase())))
}
