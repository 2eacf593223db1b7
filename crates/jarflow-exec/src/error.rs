use std::path::PathBuf;

use crate::executor::ExecError;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("failed to prepare working directory {path}")]
    WorkDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("clone of {url} failed")]
    Clone { url: String, source: ExecError },

    #[error("checkout of {git_ref} failed")]
    Checkout { git_ref: String, source: ExecError },

    #[error("gradle jar failed")]
    Build { source: ExecError },

    #[error("artifact search failed")]
    FindArtifacts { source: ExecError },

    #[error("no artifact found under {dir}")]
    NoArtifact { dir: PathBuf },

    #[error("packing artifacts into {archive} failed")]
    Archive { archive: String, source: ExecError },

    #[error("upload of {archive} failed")]
    Upload { archive: String, source: ExecError },

    #[error("failed to write job output")]
    Output { source: std::io::Error },
}
