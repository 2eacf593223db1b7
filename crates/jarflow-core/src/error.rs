#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable GIT_CLONE_URL (or _WORKFLOW_GIT_CLONE_URL) is required")]
    MissingCloneUrl,

    #[error(
        "environment variables HUB_USER and HUB_TOKEN (or _WORKFLOW_HUB_USER and _WORKFLOW_HUB_TOKEN) are required"
    )]
    MissingHubCredentials,

    #[error("cannot derive a project name from clone URL {url:?}")]
    EmptyProjectName { url: String },
}
