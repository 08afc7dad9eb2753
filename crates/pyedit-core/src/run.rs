use crate::{CoreError, Result};
use pyedit_config::IdeConfig;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of running a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl RunOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Executes a file with the configured interpreter
#[derive(Debug, Clone)]
pub struct Runner {
    interpreter: PathBuf,
}

impl Runner {
    #[must_use]
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &IdeConfig) -> Self {
        Self::new(config.interpreter.clone())
    }

    #[must_use]
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Run `file_path` to completion, capturing both output streams.
    ///
    /// A script that fails is still `Ok`; only failing to start the interpreter is an error.
    pub fn run_file(&self, file_path: &Path) -> Result<RunOutput> {
        tracing::info!(
            "Running {} with {}",
            file_path.display(),
            self.interpreter.display()
        );

        let output = Command::new(&self.interpreter)
            .arg(file_path)
            .output()
            .map_err(|source| CoreError::Spawn {
                program: self.interpreter.clone(),
                source,
            })?;

        let result = RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        tracing::info!("{} exited with {:?}", file_path.display(), result.exit_code);
        Ok(result)
    }
}
