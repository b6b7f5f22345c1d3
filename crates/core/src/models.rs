use std::{cmp::Ordering, fmt};

use serde::Deserialize;
use thiserror::Error;

/// Bucket for job names that match no known family. Sorts after everything else.
pub const FALLBACK_BUCKET: u16 = 200;

struct BucketRule {
    prefix: &'static str,
    bucket: u16,
    /// Bucket used instead when the name mentions Windows.
    windows_bucket: Option<u16>,
}

// Note: rules are checked in order, the first matching prefix wins.
const BUCKET_RULES: &[BucketRule] = &[
    BucketRule { prefix: "Initial JDK", bucket: 1, windows_bucket: None },
    BucketRule { prefix: "Calculate Test Jobs", bucket: 2, windows_bucket: None },
    BucketRule { prefix: "JVM Tests - ", bucket: 11, windows_bucket: Some(12) },
    BucketRule { prefix: "Maven Tests - ", bucket: 21, windows_bucket: Some(22) },
    BucketRule { prefix: "Gradle Tests - ", bucket: 31, windows_bucket: Some(32) },
    BucketRule { prefix: "Devtools Tests - ", bucket: 41, windows_bucket: Some(42) },
    BucketRule { prefix: "Kubernetes Tests - ", bucket: 51, windows_bucket: Some(52) },
    BucketRule { prefix: "Quickstarts Compilation", bucket: 61, windows_bucket: None },
    BucketRule { prefix: "MicroProfile TCKs Tests", bucket: 71, windows_bucket: None },
    BucketRule { prefix: "Native Tests - ", bucket: 81, windows_bucket: Some(82) },
];

/// Display bucket for a CI job name. Total: unknown names land in [`FALLBACK_BUCKET`].
pub fn classify(job_name: &str) -> u16 {
    for rule in BUCKET_RULES {
        if !job_name.starts_with(rule.prefix) {
            continue;
        }
        return match rule.windows_bucket {
            Some(windows_bucket) if job_name.contains("Windows") => windows_bucket,
            _ => rule.bucket,
        };
    }
    FALLBACK_BUCKET
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sort key of a job: bucket first, then the name compared case-insensitively.
///
/// Names that only differ by case fall back to a byte comparison so the order stays total.
#[derive(Debug, Clone, Copy)]
pub struct JobOrderKey<'a> {
    pub bucket: u16,
    pub name: &'a str,
}

impl<'a> JobOrderKey<'a> {
    pub fn new(name: &'a str) -> Self { Self { bucket: classify(name), name } }
}

impl Ord for JobOrderKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bucket
            .cmp(&other.bucket)
            .then_with(|| cmp_ignore_case(self.name, other.name))
            .then_with(|| self.name.cmp(other.name))
    }
}

impl PartialOrd for JobOrderKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for JobOrderKey<'_> {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for JobOrderKey<'_> {}

/// Conclusion of a single CI job, as reported in the status file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum JobStatus {
    Success,
    Failure,
    Cancelled,
    Skipped,
    #[default]
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Success => ":heavy_check_mark:",
            Self::Failure => "✖",
            Self::Cancelled => ":hourglass:",
            Self::Skipped => ":no_entry_sign:",
            Self::Unknown => ":question:",
        }
    }
}

impl From<Option<String>> for JobStatus {
    // The conclusion is sometimes null.
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("success") => Self::Success,
            Some("failure") => Self::Failure,
            Some("cancelled") => Self::Cancelled,
            Some("skipped") => Self::Skipped,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct JobResult {
    #[serde(rename = "jobName")]
    pub name: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(rename = "buildScanLink")]
    pub scan_link: String,
}

impl JobResult {
    pub fn order_key(&self) -> JobOrderKey<'_> { JobOrderKey::new(&self.name) }
}

#[derive(Debug, Error)]
pub enum StatusFileError {
    #[error("malformed status file: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuildStatuses {
    pr_number: u64,
    builds: Vec<JobResult>,
}

/// Job results of one workflow run, sorted by [`JobOrderKey`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BuildStatuses {
    pub pr_number: u64,
    builds: Vec<JobResult>,
}

impl BuildStatuses {
    pub fn parse(data: &[u8]) -> Result<Self, StatusFileError> {
        let RawBuildStatuses { pr_number, builds } = serde_json::from_slice(data)?;
        Ok(Self::new(pr_number, builds))
    }

    pub fn new(pr_number: u64, mut builds: Vec<JobResult>) -> Self {
        builds.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        Self { pr_number, builds }
    }

    pub fn builds(&self) -> &[JobResult] { &self.builds }

    /// Job name to build scan link, in display order.
    pub fn scan_links(&self) -> Vec<(&str, &str)> {
        self.builds.iter().map(|b| (b.name.as_str(), b.scan_link.as_str())).collect()
    }
}
