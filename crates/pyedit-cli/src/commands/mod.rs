pub mod analyze;
pub mod check;
pub mod interpreters;
pub mod run;
pub mod watch;

use anyhow::{Context, Result};
use pyedit_config::IdeConfig;
use std::path::Path;

/// Load the config named on the command line, or the nearest one above the
/// current directory, falling back to defaults.
pub fn load_config(config_path: Option<&Path>) -> Result<IdeConfig> {
    let config = if let Some(path) = config_path {
        pyedit_config::load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
    } else {
        let current_dir = std::env::current_dir()?;
        pyedit_config::load_nearest(&current_dir).context("Failed to load config")?
    };

    tracing::debug!("Using interpreter {}", config.interpreter.display());
    Ok(config)
}
