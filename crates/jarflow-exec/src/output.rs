use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Prefix the orchestrator scans stdout for.
pub const JOB_OUT_PREFIX: &str = "[JOB_OUT]";

/// A pipeline output marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutput<'a> {
    /// `[JOB_OUT] ARTIFACT = a.jar;b.jar`
    Artifact(&'a [String]),
    /// `[JOB_OUT] ARTIFACT_URL = repo/path/app.tar.bz`
    ArtifactUrl(&'a str),
}

impl fmt::Display for JobOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact(paths) => write!(f, "{JOB_OUT_PREFIX} ARTIFACT = {}", paths.join(";")),
            Self::ArtifactUrl(url) => write!(f, "{JOB_OUT_PREFIX} ARTIFACT_URL = {url}"),
        }
    }
}

/// Summary of a successful job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub project_name: String,
    pub repo_dir: PathBuf,
    /// Whether clone and checkout were skipped because the repo was already present.
    pub reused_checkout: bool,
    pub artifacts: Vec<String>,
    /// Archive name, set only when artifacts were uploaded.
    pub archive: Option<String>,
    pub artifact_url: Option<String>,
}
