use anyhow::{Context, Result};
use colored::Colorize;
use pyedit_config::IdeConfig;
use pyedit_core::Runner;
use std::path::Path;
use std::process;

pub fn run(config: &IdeConfig, file: &Path) -> Result<()> {
    let output = Runner::from_config(config)
        .run_file(file)
        .with_context(|| format!("Failed to run {}", file.display()))?;

    print!("{}", output.stdout);
    if !output.stderr.is_empty() {
        eprint!("{}", output.stderr.red());
    }

    match output.exit_code {
        Some(0) => Ok(()),
        Some(code) => {
            eprintln!("{}", format!("Process exited with code {code}").yellow());
            process::exit(code);
        }
        None => {
            eprintln!("{}", "Process was terminated by a signal".red());
            process::exit(1);
        }
    }
}
