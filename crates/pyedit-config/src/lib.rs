mod config;
mod error;
mod interpreter;
mod loader;

pub use config::{
    AnalysisSettings, IdeConfig, LintSettings, DEFAULT_ANALYSIS_TIMEOUT_MS,
    DEFAULT_QUIET_INTERVAL_MS,
};
pub use error::{ConfigError, Result};
pub use interpreter::{discover_in, discover_interpreters};
pub use loader::{find_config, load_config, load_config_from_str, load_nearest};
