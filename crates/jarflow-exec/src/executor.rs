use std::fmt;
use std::path::{Path, PathBuf};

/// Argument prefixes whose values never appear in echoed command lines.
const MASKED_PREFIXES: &[&str] = &["--password="];

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Directory to run in; `None` inherits the process's own.
    pub workdir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            workdir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match MASKED_PREFIXES.iter().find(|p| arg.starts_with(*p)) {
                Some(prefix) => write!(f, "{prefix}******")?,
                None => f.write_str(arg)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("failed to read output of `{command}`")]
    Capture {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", describe_code(*code))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

impl ExecError {
    /// Captured output of a failed command, if it got far enough to produce any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_owned(),
    }
}

/// Abstraction over external program execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion and return its combined stdout/stderr.
    ///
    /// Fails when the program cannot be started or exits non-zero.
    async fn run(&self, command: &CommandSpec) -> Result<String, ExecError>;
}

/// Executor backed by real child processes.
///
/// Echoes the command line and its captured output to stdout so the CI log
/// shows every step.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn run(&self, command: &CommandSpec) -> Result<String, ExecError> {
        use std::process::Stdio;

        let Some((program, args)) = command.argv.split_first() else {
            return Err(ExecError::EmptyCommand);
        };

        let shown = command.to_string();
        println!("Run CMD: {shown}");

        let spawn_error = |source| ExecError::Spawn {
            command: shown.clone(),
            source,
        };

        // stdout and stderr share one pipe so the captured text keeps the
        // order the program wrote it in.
        let (reader, writer) = std::io::pipe().map_err(spawn_error)?;
        let stderr_writer = writer.try_clone().map_err(spawn_error)?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer);
        if let Some(dir) = command.workdir() {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %shown, workdir = ?command.workdir(), "spawning");
        let spawned = cmd.spawn();
        // Release the parent's write ends, otherwise the reader never sees EOF.
        drop(cmd);
        let mut child = spawned.map_err(spawn_error)?;

        let capture = tokio::task::spawn_blocking(move || read_all(reader));
        let status = child.wait().await.map_err(spawn_error)?;
        let captured = capture
            .await
            .map_err(std::io::Error::other)
            .and_then(|read| read)
            .map_err(|source| ExecError::Capture {
                command: shown.clone(),
                source,
            })?;

        let combined = String::from_utf8_lossy(&captured).into_owned();
        if !combined.is_empty() {
            println!("{combined}");
        }

        if status.success() {
            Ok(combined)
        } else {
            tracing::debug!(command = %shown, status = %status, "command failed");
            Err(ExecError::Failed {
                command: shown,
                code: status.code(),
                output: combined,
            })
        }
    }
}

fn read_all(mut reader: std::io::PipeReader) -> std::io::Result<Vec<u8>> {
    use std::io::Read;

    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_masks_password() {
        let spec = CommandSpec::new(["thub", "push", "--username=u", "--password=hunter2"]);
        assert_eq!(spec.to_string(), "thub push --username=u --password=******");
    }

    #[test]
    fn in_dir_sets_workdir() {
        let spec = CommandSpec::new(["git", "status"]).in_dir("/tmp/repo");
        assert_eq!(spec.workdir(), Some(Path::new("/tmp/repo")));
        assert_eq!(spec.program(), Some("git"));
    }

    #[test]
    fn failed_error_carries_output() {
        let err = ExecError::Failed {
            command: "gradle jar".to_owned(),
            code: Some(1),
            output: "BUILD FAILED".to_owned(),
        };
        assert_eq!(err.output(), Some("BUILD FAILED"));
        assert!(err.to_string().contains("exit code 1"));
    }
}
