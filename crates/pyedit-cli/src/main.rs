mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pyedit")]
#[command(about = "Python code intelligence: linting, navigation and script running", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to pyedit config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint Python files and report diagnostics
    Check {
        /// Files, directories or glob patterns
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Jump to the definition of the symbol at a position
    Definition(Location),

    /// List usages of the symbol at a position
    References(Location),

    /// Show the docstring of the symbol at a position
    Hover(Location),

    /// Show call signatures at a position
    Calltip(Location),

    /// List completions at a position
    Complete(Location),

    /// Run a script with the configured interpreter
    Run {
        file: PathBuf,
    },

    /// Re-lint a file whenever it changes on disk
    Watch {
        file: PathBuf,
    },

    /// List Python interpreters found on this machine
    Interpreters,
}

/// A position in a file: 1-based line, 0-based column
#[derive(Args)]
struct Location {
    file: PathBuf,
    line: usize,
    column: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { paths, format } => commands::check::run(&config, &paths, format)?,
        Commands::Definition(at) => commands::analyze::definition(&config, &at)?,
        Commands::References(at) => commands::analyze::references(&config, &at)?,
        Commands::Hover(at) => commands::analyze::hover(&config, &at)?,
        Commands::Calltip(at) => commands::analyze::calltip(&config, &at)?,
        Commands::Complete(at) => commands::analyze::complete(&config, &at)?,
        Commands::Run { file } => commands::run::run(&config, &file)?,
        Commands::Watch { file } => commands::watch::run(&config, file).await?,
        Commands::Interpreters => commands::interpreters::run(&config),
    }

    Ok(())
}
