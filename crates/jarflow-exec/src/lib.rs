//! Build job steps for jarflow.
//!
//! # Job pipeline
//!
//! ```text
//! jarflow run
//!   1. Fetch     ── git clone --recurse-submodules <url> <project>   (skipped if repo dir exists)
//!   2. Checkout  ── git checkout <ref> --
//!   3. Build     ── gradle jar -b <entry file>
//!   4. Discover  ── find ./ -name *.jar          → [JOB_OUT] ARTIFACT = ...
//!   5. Pack      ── tar -cjf <project>.tar.bz    (only with HUB_REPO)
//!   6. Upload    ── thub push ...                → [JOB_OUT] ARTIFACT_URL = ...
//! ```
//!
//! Every external program goes through [`CommandExecutor`], so the whole
//! pipeline runs against a mock in tests.

pub mod error;
pub mod executor;
pub mod job;
pub mod output;

pub use error::JobError;
pub use executor::{CommandExecutor, CommandSpec, ExecError, RealExecutor};
pub use job::{ArtifactOutcome, BuildJob, DEFAULT_UPLOAD_CLI};
pub use output::{JobOutput, JobReport};
