use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Quiet period before a buffer is re-linted, in milliseconds.
pub const DEFAULT_QUIET_INTERVAL_MS: u64 = 5000;

/// Upper bound on a single analysis helper invocation, in milliseconds.
pub const DEFAULT_ANALYSIS_TIMEOUT_MS: u64 = 10_000;

#[cfg(windows)]
const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(windows))]
const DEFAULT_INTERPRETER: &str = "python3";

/// Top-level editor configuration.
///
/// Passed explicitly to every component that needs it; there is no process-wide
/// settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdeConfig {
    /// Python interpreter used to run files, the linter and the analysis helper
    pub interpreter: PathBuf,

    /// Linter settings
    pub lint: LintSettings,

    /// Static analysis settings
    pub analysis: AnalysisSettings,
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            lint: LintSettings::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

impl IdeConfig {
    /// Resolve relative paths in the configuration against `base_dir`.
    ///
    /// Bare interpreter names (`python3`) are left alone so they are looked up on `PATH`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: &Path) -> Self {
        if let Some(rcfile) = self.lint.rcfile.take() {
            self.lint.rcfile = Some(if rcfile.is_relative() {
                base_dir.join(rcfile)
            } else {
                rcfile
            });
        }

        if self.interpreter.is_relative() && self.interpreter.components().count() > 1 {
            self.interpreter = base_dir.join(&self.interpreter);
        }

        self
    }
}

/// Linter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LintSettings {
    /// Whether background linting runs at all
    pub enabled: bool,

    /// Optional pylint rcfile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcfile: Option<PathBuf>,

    /// Extra arguments passed to the linter before the file path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,

    /// Quiet period after the last edit before a check runs
    pub quiet_interval_ms: u64,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rcfile: None,
            extra_args: Vec::new(),
            quiet_interval_ms: DEFAULT_QUIET_INTERVAL_MS,
        }
    }
}

impl LintSettings {
    #[must_use]
    pub const fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.quiet_interval_ms)
    }
}

/// Static analysis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    /// Memoise answers per buffer content
    pub cache: bool,

    /// Kill the analysis helper after this long
    pub timeout_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cache: false,
            timeout_ms: DEFAULT_ANALYSIS_TIMEOUT_MS,
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
