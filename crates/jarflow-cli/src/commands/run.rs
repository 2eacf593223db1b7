use std::path::Path;

use anyhow::Context;
use jarflow_core::{JobConfig, WorkspaceRoots};
use jarflow_exec::BuildJob;

/// Resolve configuration and execute the build job.
pub async fn run(
    roots: &WorkspaceRoots,
    env_file: Option<&Path>,
    upload_cli: &Path,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let env = super::env::load(env_file)?;
    let config = JobConfig::from_env(&env, roots)?;

    tracing::info!(
        project = config.project_name(),
        repo_dir = %config.repo_dir().display(),
        "starting build job"
    );

    let job = BuildJob::new(config).with_upload_cli(upload_cli);
    let mut stdout = std::io::stdout();
    let report = job.run(&mut stdout).await?;

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write job report to {}", path.display()))?;
    }

    Ok(())
}
