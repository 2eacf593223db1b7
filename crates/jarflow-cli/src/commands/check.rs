use std::path::Path;

use jarflow_core::{JobConfig, WorkspaceRoots};

/// Resolve and print the job configuration. No external command is run.
pub fn check(roots: &WorkspaceRoots, env_file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let env = super::env::load(env_file)?;
    let config = JobConfig::from_env(&env, roots)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Project:        {}", config.project_name());
    println!("Clone URL:      {}", config.git_clone_url());
    println!("Ref:            {}", config.git_ref());
    println!("Entry file:     {}", config.entry_file());
    println!("Registry user:  {}", config.hub_user());
    match config.hub_repo() {
        Some(repo) => println!("Registry repo:  {repo}"),
        None => println!("Registry repo:  (none, upload disabled)"),
    }
    println!("Artifact path:  {}", config.artifact_path());
    println!("Artifact tag:   {}", config.artifact_tag());
    println!(
        "Cache:          {}",
        if config.cache_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("Work dir:       {}", config.work_dir().display());
    println!("Repo dir:       {}", config.repo_dir().display());

    Ok(())
}
