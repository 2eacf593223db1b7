use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use jarflow_core::{JobConfig, join_slash};

use crate::error::JobError;
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};
use crate::output::{JobOutput, JobReport};

/// Registry CLI shipped in the workflow image.
pub const DEFAULT_UPLOAD_CLI: &str = "/.workflow/bin/thub";

/// Artifacts collected from a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub artifacts: Vec<String>,
    /// `(archive name, artifact URL)` when the artifacts were uploaded.
    pub upload: Option<(String, String)>,
}

/// One build job, parameterized over the executor for testability.
pub struct BuildJob<E: CommandExecutor = RealExecutor> {
    config: JobConfig,
    executor: E,
    upload_cli: PathBuf,
}

impl BuildJob<RealExecutor> {
    pub fn new(config: JobConfig) -> Self {
        Self::with_executor(config, RealExecutor)
    }
}

impl<E: CommandExecutor> BuildJob<E> {
    pub fn with_executor(config: JobConfig, executor: E) -> Self {
        Self {
            config,
            executor,
            upload_cli: PathBuf::from(DEFAULT_UPLOAD_CLI),
        }
    }

    pub fn with_upload_cli(mut self, upload_cli: impl Into<PathBuf>) -> Self {
        self.upload_cli = upload_cli.into();
        self
    }

    /// Run the whole job: fetch if needed, build, then handle artifacts.
    ///
    /// Step messages and `[JOB_OUT]` markers go to `out`. The first failing
    /// step aborts the run.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<JobReport, JobError> {
        let config = &self.config;
        self.prepare_work_dir().await?;

        let reused_checkout = self.repo_present().await?;
        if reused_checkout {
            // Cached checkouts are never moved to a newer ref.
            tracing::warn!(
                repo_dir = %config.repo_dir().display(),
                git_ref = config.git_ref(),
                "repository already present, skipping clone and checkout"
            );
            emit(
                out,
                format_args!(
                    "Repository {} already present, skip clone.",
                    config.repo_dir().display()
                ),
            )?;
        } else {
            self.fetch(out).await?;
            self.checkout(out).await?;
        }

        self.build(out).await?;
        let outcome = self.handle_artifacts(out).await?;

        let (archive, artifact_url) = match outcome.upload {
            Some((archive, url)) => (Some(archive), Some(url)),
            None => (None, None),
        };

        Ok(JobReport {
            project_name: config.project_name().to_owned(),
            repo_dir: config.repo_dir().to_path_buf(),
            reused_checkout,
            artifacts: outcome.artifacts,
            archive,
            artifact_url,
        })
    }

    async fn prepare_work_dir(&self) -> Result<(), JobError> {
        let work_dir = self.config.work_dir();
        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|e| JobError::WorkDir {
                path: work_dir.to_path_buf(),
                source: e,
            })
    }

    async fn repo_present(&self) -> Result<bool, JobError> {
        let repo_dir = self.config.repo_dir();
        tokio::fs::try_exists(repo_dir)
            .await
            .map_err(|e| JobError::WorkDir {
                path: repo_dir.to_path_buf(),
                source: e,
            })
    }

    // ── Fetch ──

    /// Clone the repository, with submodules, into the working directory.
    pub async fn fetch<W: Write>(&self, out: &mut W) -> Result<(), JobError> {
        let config = &self.config;
        tracing::info!(url = config.git_clone_url(), "cloning");

        let cmd = CommandSpec::new([
            "git",
            "clone",
            "--recurse-submodules",
            config.git_clone_url(),
            config.project_name(),
        ])
        .in_dir(config.work_dir());

        match self.executor.run(&cmd).await {
            Ok(_) => emit(
                out,
                format_args!("Clone project {} succeed.", config.git_clone_url()),
            ),
            Err(e) => {
                emit(out, format_args!("Clone project failed: {e}"))?;
                Err(JobError::Clone {
                    url: config.git_clone_url().to_owned(),
                    source: e,
                })
            }
        }
    }

    /// Check out the configured ref inside the repository directory.
    pub async fn checkout<W: Write>(&self, out: &mut W) -> Result<(), JobError> {
        let config = &self.config;
        tracing::info!(git_ref = config.git_ref(), "checking out");

        let cmd = CommandSpec::new(["git", "checkout", config.git_ref(), "--"])
            .in_dir(config.repo_dir());

        match self.executor.run(&cmd).await {
            Ok(_) => emit(out, format_args!("Switch to {} succeed.", config.git_ref())),
            Err(e) => {
                emit(
                    out,
                    format_args!("Switch to commit {} failed: {e}", config.git_ref()),
                )?;
                Err(JobError::Checkout {
                    git_ref: config.git_ref().to_owned(),
                    source: e,
                })
            }
        }
    }

    // ── Build ──

    /// Run `gradle jar` against the configured build descriptor.
    pub async fn build<W: Write>(&self, out: &mut W) -> Result<(), JobError> {
        let config = &self.config;
        tracing::info!(entry_file = config.entry_file(), "building");

        let cmd = CommandSpec::new(["gradle", "jar", "-b", config.entry_file()])
            .in_dir(config.repo_dir());

        match self.executor.run(&cmd).await {
            Ok(_) => emit(out, "Run gradle jar succeed."),
            Err(e) => {
                emit(out, format_args!("Run gradle jar failed: {e}"))?;
                Err(JobError::Build { source: e })
            }
        }
    }

    // ── Artifacts ──

    /// Locate built jars, report them, and upload them when a registry
    /// repository is configured.
    pub async fn handle_artifacts<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<ArtifactOutcome, JobError> {
        let config = &self.config;
        let repo_dir = config.repo_dir();

        let artifacts = self.find_artifacts(out, repo_dir).await?;
        emit(out, JobOutput::Artifact(&artifacts))?;

        let Some(hub_repo) = config.hub_repo() else {
            tracing::info!("no registry repository configured, skipping upload");
            emit(out, "HUB_REPO is empty, no need upload artifacts")?;
            return Ok(ArtifactOutcome {
                artifacts,
                upload: None,
            });
        };

        let archive = config.archive_name();
        self.pack(out, repo_dir, &archive, &artifacts).await?;
        self.upload(out, repo_dir, hub_repo, &archive).await?;

        let url = join_slash([hub_repo, config.artifact_path(), archive.as_str()]);
        emit(out, JobOutput::ArtifactUrl(&url))?;
        emit(out, "Run upload artifacts succeed.")?;

        Ok(ArtifactOutcome {
            artifacts,
            upload: Some((archive, url)),
        })
    }

    async fn find_artifacts<W: Write>(
        &self,
        out: &mut W,
        repo_dir: &Path,
    ) -> Result<Vec<String>, JobError> {
        let cmd = CommandSpec::new(["find", "./", "-name", "*.jar"]).in_dir(repo_dir);

        let listing = match self.executor.run(&cmd).await {
            Ok(listing) => listing,
            Err(e) => {
                emit(out, format_args!("Run find artifacts failed: {e}"))?;
                return Err(JobError::FindArtifacts { source: e });
            }
        };

        let artifacts = parse_artifact_listing(&listing);
        if artifacts.is_empty() {
            return Err(JobError::NoArtifact {
                dir: repo_dir.to_path_buf(),
            });
        }
        tracing::info!(count = artifacts.len(), "artifacts found");
        Ok(artifacts)
    }

    async fn pack<W: Write>(
        &self,
        out: &mut W,
        repo_dir: &Path,
        archive: &str,
        artifacts: &[String],
    ) -> Result<(), JobError> {
        let mut argv = vec!["tar".to_owned(), "-cjf".to_owned(), archive.to_owned()];
        argv.extend(artifacts.iter().cloned());
        let cmd = CommandSpec::new(argv).in_dir(repo_dir);

        if let Err(e) = self.executor.run(&cmd).await {
            emit(out, format_args!("Run tar artifacts failed: {e}"))?;
            return Err(JobError::Archive {
                archive: archive.to_owned(),
                source: e,
            });
        }
        Ok(())
    }

    async fn upload<W: Write>(
        &self,
        out: &mut W,
        repo_dir: &Path,
        hub_repo: &str,
        archive: &str,
    ) -> Result<(), JobError> {
        let config = &self.config;
        tracing::info!(repo = hub_repo, tag = config.artifact_tag(), "uploading");

        let cmd = CommandSpec::new([
            self.upload_cli.to_string_lossy().into_owned(),
            "push".to_owned(),
            format!("--username={}", config.hub_user()),
            format!("--password={}", config.hub_token()),
            format!("--repo={hub_repo}"),
            format!("--localpath={archive}"),
            format!("--path={}", join_slash([config.artifact_path(), archive])),
            format!("--tag={}", config.artifact_tag()),
        ])
        .in_dir(repo_dir);

        if let Err(e) = self.executor.run(&cmd).await {
            emit(out, format_args!("Run upload artifacts failed: {e}"))?;
            return Err(JobError::Upload {
                archive: archive.to_owned(),
                source: e,
            });
        }
        Ok(())
    }
}

/// Split `find` output into artifact paths, dropping blank lines.
pub fn parse_artifact_listing(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn emit<W: Write>(out: &mut W, line: impl fmt::Display) -> Result<(), JobError> {
    writeln!(out, "{line}").map_err(|e| JobError::Output { source: e })
}
