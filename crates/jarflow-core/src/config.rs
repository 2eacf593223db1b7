use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::ConfigError;

/// Scratch space used when the workflow cache is disabled.
pub const SCRATCH_SPACE: &str = "/root/src";
/// Persistent space reused across runs when the workflow cache is enabled.
pub const CACHE_SPACE: &str = "/workflow-cache";

pub const DEFAULT_GIT_REF: &str = "master";
pub const DEFAULT_ENTRY_FILE: &str = "./build.gradle";
pub const DEFAULT_ARTIFACT_TAG: &str = "latest";

/// Environment variable names read by [`JobConfig::from_env`].
pub mod vars {
    pub const GIT_CLONE_URL: &str = "GIT_CLONE_URL";
    pub const GIT_REF: &str = "GIT_REF";
    pub const WORKFLOW_GIT_CLONE_URL: &str = "_WORKFLOW_GIT_CLONE_URL";
    pub const WORKFLOW_GIT_REF: &str = "_WORKFLOW_GIT_REF";
    pub const ENTRY_FILE: &str = "ENTRY_FILE";
    pub const HUB_USER: &str = "HUB_USER";
    pub const HUB_TOKEN: &str = "HUB_TOKEN";
    pub const WORKFLOW_HUB_USER: &str = "_WORKFLOW_HUB_USER";
    pub const WORKFLOW_HUB_TOKEN: &str = "_WORKFLOW_HUB_TOKEN";
    pub const HUB_REPO: &str = "HUB_REPO";
    pub const ARTIFACT_PATH: &str = "ARTIFACT_PATH";
    pub const ARTIFACT_TAG: &str = "ARTIFACT_TAG";
    pub const WORKFLOW_FLAG_CACHE: &str = "_WORKFLOW_FLAG_CACHE";
}

/// The two roots a job may clone into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceRoots {
    pub scratch: PathBuf,
    pub cache: PathBuf,
}

impl Default for WorkspaceRoots {
    fn default() -> Self {
        Self {
            scratch: PathBuf::from(SCRATCH_SPACE),
            cache: PathBuf::from(CACHE_SPACE),
        }
    }
}

/// Resolved, validated configuration for one build job.
///
/// Built once from the environment and read-only afterwards. The project
/// name and directories are always derived from the clone URL and the
/// cache flag; nothing lets a caller set them directly.
#[derive(Debug, Serialize)]
pub struct JobConfig {
    git_clone_url: String,
    git_ref: String,
    entry_file: String,

    hub_user: String,
    #[serde(skip)]
    hub_token: SecretString,
    hub_repo: String,
    artifact_path: String,
    artifact_tag: String,

    cache_enabled: bool,
    project_name: String,
    work_dir: PathBuf,
    repo_dir: PathBuf,
}

impl JobConfig {
    /// Resolve a configuration from an environment map.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_env(
        env: &HashMap<String, String>,
        roots: &WorkspaceRoots,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| env.get(key).map(String::as_str).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| match get(key) {
            Some(value) => value.to_owned(),
            None => default.to_owned(),
        };

        let git_clone_url = get(vars::GIT_CLONE_URL)
            .or_else(|| get(vars::WORKFLOW_GIT_CLONE_URL))
            .ok_or(ConfigError::MissingCloneUrl)?
            .to_owned();

        let git_ref = match get(vars::GIT_REF).or_else(|| get(vars::WORKFLOW_GIT_REF)) {
            Some(git_ref) => git_ref.to_owned(),
            None => DEFAULT_GIT_REF.to_owned(),
        };

        let project_name = project_name_from_url(&git_clone_url);
        if project_name.is_empty() {
            return Err(ConfigError::EmptyProjectName { url: git_clone_url });
        }

        let entry_file = get_or(vars::ENTRY_FILE, DEFAULT_ENTRY_FILE);

        let (mut hub_user, mut hub_token) = (get(vars::HUB_USER), get(vars::HUB_TOKEN));
        if hub_user.is_none() && hub_token.is_none() {
            hub_user = get(vars::WORKFLOW_HUB_USER);
            hub_token = get(vars::WORKFLOW_HUB_TOKEN);
        }
        let (Some(hub_user), Some(hub_token)) = (hub_user, hub_token) else {
            return Err(ConfigError::MissingHubCredentials);
        };

        let cache_enabled = get(vars::WORKFLOW_FLAG_CACHE)
            .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));

        let work_dir = if cache_enabled {
            roots.cache.clone()
        } else {
            roots.scratch.clone()
        };
        let repo_dir = work_dir.join(&project_name);

        tracing::debug!(
            project = %project_name,
            git_ref = %git_ref,
            cache_enabled,
            work_dir = %work_dir.display(),
            "resolved job configuration"
        );

        Ok(Self {
            git_clone_url,
            git_ref,
            entry_file,
            hub_user: hub_user.to_owned(),
            hub_token: SecretString::from(hub_token.to_owned()),
            hub_repo: get_or(vars::HUB_REPO, ""),
            artifact_path: get_or(vars::ARTIFACT_PATH, ""),
            artifact_tag: get_or(vars::ARTIFACT_TAG, DEFAULT_ARTIFACT_TAG),
            cache_enabled,
            project_name,
            work_dir,
            repo_dir,
        })
    }

    pub fn git_clone_url(&self) -> &str {
        &self.git_clone_url
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    pub fn entry_file(&self) -> &str {
        &self.entry_file
    }

    pub fn hub_user(&self) -> &str {
        &self.hub_user
    }

    /// Registry token. Only exposed where it has to reach the upload CLI.
    pub fn hub_token(&self) -> &str {
        self.hub_token.expose_secret()
    }

    /// Target registry repository; `None` when uploading is disabled.
    pub fn hub_repo(&self) -> Option<&str> {
        Some(self.hub_repo.as_str()).filter(|r| !r.is_empty())
    }

    pub fn artifact_path(&self) -> &str {
        &self.artifact_path
    }

    pub fn artifact_tag(&self) -> &str {
        &self.artifact_tag
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Archive uploaded to the registry: `<project>.tar.bz`.
    pub fn archive_name(&self) -> String {
        format!("{}.tar.bz", self.project_name)
    }
}

/// Derive the project name from a clone URL.
///
/// One trailing `/` and then a trailing `.git` are stripped before taking
/// the last path segment.
pub fn project_name_from_url(url: &str) -> String {
    let mut trimmed = url;
    if let Some(stripped) = trimmed.strip_suffix('/') {
        trimmed = stripped;
    }
    if let Some(stripped) = trimmed.strip_suffix(".git") {
        trimmed = stripped;
    }
    match trimmed.rfind('/') {
        Some(idx) => trimmed[idx + 1..].to_owned(),
        None => trimmed.to_owned(),
    }
}

/// Join path-like segments with `/` and clean the result lexically.
///
/// Empty segments are skipped. The joined path then has repeated
/// separators collapsed, `.` segments dropped and `..` resolved against the
/// preceding segment. A leading `/` is kept. When every segment is empty
/// the result is empty.
///
/// Used for registry paths, which are not filesystem paths.
pub fn join_slash<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = segments.into_iter().filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    clean_slash(&parts.join("/"))
}

fn clean_slash(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut kept: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match kept.last() {
                Some(&last) if last != ".." => {
                    kept.pop();
                }
                // `..` above the root stays at the root.
                _ if rooted => {}
                _ => kept.push(".."),
            },
            part => kept.push(part),
        }
    }

    let body = kept.join("/");
    if rooted {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_owned()
    } else {
        body
    }
}
