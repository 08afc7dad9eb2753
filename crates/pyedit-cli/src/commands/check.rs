use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pyedit_config::IdeConfig;
use pyedit_core::lint::summary_line;
use pyedit_core::{DiagnosticsClient, IndicatorStyle, Pylint};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;

pub fn run(config: &IdeConfig, paths: &[String], format: OutputFormat) -> Result<()> {
    if !config.lint.enabled {
        println!("{}", "Linting is disabled in the config".yellow());
        return Ok(());
    }

    let files = collect_files(paths)?;
    if files.is_empty() {
        eprintln!("{}", "No Python files found".red());
        process::exit(1);
    }

    let client = DiagnosticsClient::new(Pylint::from_config(config));

    let progress = if matches!(format, OutputFormat::Human) && files.len() > 1 {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .context("Invalid progress template")?
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        if let Some(bar) = &progress {
            bar.set_message(file.display().to_string());
        }
        reports.push((file, client.check(file)));
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for (file, diagnostics) in &reports {
        for diagnostic in diagnostics {
            match diagnostic.indicator_style() {
                IndicatorStyle::Hard => total_errors += 1,
                IndicatorStyle::Soft => total_warnings += 1,
            }
        }

        match format {
            OutputFormat::Human => {
                if diagnostics.is_empty() {
                    continue;
                }
                println!("\n{}", file.display().to_string().bold());
                for diagnostic in diagnostics {
                    let line = summary_line(diagnostic);
                    match diagnostic.indicator_style() {
                        IndicatorStyle::Hard => println!("{}", line.red()),
                        IndicatorStyle::Soft if diagnostic.is_rendered() => {
                            println!("{}", line.yellow());
                        }
                        IndicatorStyle::Soft => println!("{}", line.dimmed()),
                    }
                }
            }
            OutputFormat::Json => {
                for diagnostic in diagnostics {
                    println!(
                        "{}",
                        serde_json::json!({
                            "file": file,
                            "style": diagnostic.indicator_style(),
                            "diagnostic": diagnostic,
                        })
                    );
                }
            }
        }
    }

    // Summary
    if matches!(format, OutputFormat::Human) {
        println!();
        if total_errors == 0 && total_warnings == 0 {
            println!("{}", "✓ No issues found!".green().bold());
        } else if total_errors == 0 {
            println!(
                "{}",
                format!("✓ Passed with {total_warnings} warning(s)")
                    .yellow()
                    .bold()
            );
        } else {
            println!(
                "{}",
                format!("✗ Found {total_errors} error(s) and {total_warnings} warning(s)").red()
            );
        }
    }

    if total_errors > 0 {
        process::exit(1);
    }

    Ok(())
}

/// Expand files, directories and glob patterns into a sorted list of `.py` files
fn collect_files(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for pattern in paths {
        let path = Path::new(pattern);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            files.extend(walk_python_files(path));
        } else {
            let entries =
                glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern}"))?;
            for entry in entries {
                match entry {
                    Ok(path) if path.is_dir() => files.extend(walk_python_files(&path)),
                    Ok(path) if is_python(&path) => {
                        files.insert(path);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping unreadable path: {e}"),
                }
            }
        }
    }

    Ok(files.into_iter().collect())
}

fn walk_python_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable path: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_python(entry.path()))
        .map(walkdir::DirEntry::into_path)
}

fn is_python(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// Hidden directories, virtualenvs and bytecode caches
fn is_ignored_dir(path: &Path) -> bool {
    path.is_dir()
        && path.file_name().is_some_and(|name| {
            let name = name.to_string_lossy();
            name.starts_with('.')
                || name == "__pycache__"
                || name == "venv"
                || name == "node_modules"
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("pkg/__pycache__")).unwrap();
        fs::create_dir_all(root.join(".venv/lib")).unwrap();
        fs::write(root.join("main.py"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("pkg/util.py"), "").unwrap();
        fs::write(root.join("pkg/__pycache__/util.py"), "").unwrap();
        fs::write(root.join(".venv/lib/site.py"), "").unwrap();

        let files = collect_files(&[root.display().to_string()]).unwrap();
        assert_eq!(files, vec![root.join("main.py"), root.join("pkg/util.py")]);

        let pattern = format!("{}/pkg/*.py", root.display());
        let files = collect_files(&[pattern]).unwrap();
        assert_eq!(files, vec![root.join("pkg/util.py")]);
    }
}
