//! Core types and configuration for jarflow.
//!
//! A build job is configured entirely through flat environment variables.
//! [`JobConfig::from_env`] resolves them once, applying the workflow-prefixed
//! fallbacks and defaults, and derives the project name and directories.

pub mod config;
pub mod error;

pub use config::{JobConfig, WorkspaceRoots, join_slash, project_name_from_url};
pub use error::ConfigError;
