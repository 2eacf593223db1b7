mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jarflow_core::WorkspaceRoots;
use jarflow_exec::DEFAULT_UPLOAD_CLI;

#[derive(Parser)]
#[command(
    name = "jarflow",
    about = "Clone, build with gradle, and publish jar artifacts from CI"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the build job configured by environment variables
    Run {
        #[command(flatten)]
        env: EnvArgs,
        /// Registry CLI used to push the artifact archive
        #[arg(long, default_value = DEFAULT_UPLOAD_CLI)]
        upload_cli: PathBuf,
        /// Also write a JSON job report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Resolve and print the job configuration without running anything
    Check {
        #[command(flatten)]
        env: EnvArgs,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct EnvArgs {
    /// Working directory used when the workflow cache is disabled
    #[arg(long, default_value = jarflow_core::config::SCRATCH_SPACE)]
    scratch_dir: PathBuf,
    /// Working directory used when _WORKFLOW_FLAG_CACHE=true
    #[arg(long, default_value = jarflow_core::config::CACHE_SPACE)]
    cache_dir: PathBuf,
    /// dotenv file read before the process environment (process variables win)
    #[arg(long)]
    env_file: Option<PathBuf>,
}

impl EnvArgs {
    fn roots(&self) -> WorkspaceRoots {
        WorkspaceRoots {
            scratch: self.scratch_dir.clone(),
            cache: self.cache_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the [JOB_OUT] protocol, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="an unset or invalid RUST_LOG falls back to the info level"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            env,
            upload_cli,
            report,
        } => {
            commands::run(
                &env.roots(),
                env.env_file.as_deref(),
                &upload_cli,
                report.as_deref(),
            )
            .await?
        }
        Commands::Check { env, json } => {
            commands::check(&env.roots(), env.env_file.as_deref(), json)?
        }
    }

    Ok(())
}
