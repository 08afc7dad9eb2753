use crate::{ConfigError, IdeConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
const CONFIG_FILES: &[&str] = &[
    ".pyeditrc.yml",
    ".pyeditrc.yaml",
    ".pyeditrc.json",
    ".pyeditrc",
    "pyedit.config.yml",
    "pyedit.config.yaml",
    "pyedit.config.json",
];

/// Find a pyedit config file by walking up the directory tree from the given start directory.
/// Returns the path to the config file if found.
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();

    loop {
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Ok(None)
}

/// Load a config from the specified path.
///
/// Relative paths inside the file are resolved against the file's directory.
pub fn load_config(path: &Path) -> Result<IdeConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;

    Ok(match path.parent() {
        Some(base_dir) => config.with_base_dir(base_dir),
        None => config,
    })
}

/// Locate and load the nearest config above `start_dir`, falling back to defaults.
pub fn load_nearest(start_dir: &Path) -> Result<IdeConfig> {
    match find_config(start_dir)? {
        Some(path) => load_config(&path),
        None => Ok(IdeConfig::default()),
    }
}

/// Load a config from a string.
/// The path is used for error messages and format detection.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<IdeConfig> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        "" if file_name == ".pyeditrc" => {
            // .pyeditrc without extension - try YAML first, then JSON
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<IdeConfig> {
    // An empty file is a valid "all defaults" config
    if contents.trim().is_empty() {
        return Ok(IdeConfig::default());
    }

    serde_yaml::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<IdeConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

fn validate_config(config: &IdeConfig, path: &Path) -> Result<()> {
    if config.interpreter.as_os_str().is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "interpreter must not be empty".to_string(),
        });
    }

    if config.lint.quiet_interval_ms == 0 {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "lint.quietIntervalMs must be greater than zero".to_string(),
        });
    }

    if config.analysis.timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "analysis.timeoutMs must be greater than zero".to_string(),
        });
    }

    if config.lint.extra_args.iter().any(|arg| arg.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "lint.extraArgs contains an empty argument".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_yaml() {
        let yaml = r#"
interpreter: "/opt/python/bin/python3"
lint:
  rcfile: "/etc/pylintrc"
  quietIntervalMs: 1500
analysis:
  cache: true
"#;

        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.interpreter, PathBuf::from("/opt/python/bin/python3"));
        assert_eq!(config.lint.rcfile, Some(PathBuf::from("/etc/pylintrc")));
        assert_eq!(config.lint.quiet_interval_ms, 1500);
        assert!(config.analysis.cache);
    }

    #[test]
    fn test_load_json() {
        let json = r#"
{
  "interpreter": "python3.12",
  "lint": { "enabled": false }
}
"#;

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.interpreter, PathBuf::from("python3.12"));
        assert!(!config.lint.enabled);
    }

    #[test]
    fn test_relative_rcfile_resolved_against_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".pyeditrc.yml");
        fs::write(&config_path, "lint:\n  rcfile: pylintrc\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.lint.rcfile, Some(temp_dir.path().join("pylintrc")));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = load_config_from_str("", Path::new(".pyeditrc.yml")).unwrap();
        assert_eq!(config, IdeConfig::default());
    }

    #[test]
    fn test_validation_zero_quiet_interval() {
        let result = load_config_from_str(
            "lint:\n  quietIntervalMs: 0\n",
            Path::new("pyedit.config.yml"),
        );
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validation_empty_interpreter() {
        let result = load_config_from_str(r#"{"interpreter": ""}"#, Path::new("x.json"));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_unsupported_format() {
        let result = load_config_from_str("interpreter = 'python'", Path::new("pyedit.toml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_config(&temp_dir.path().join(".pyeditrc.yml"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_extensionless_rc_accepts_json() {
        let config =
            load_config_from_str(r#"{"lint": {"quietIntervalMs": 42}}"#, Path::new(".pyeditrc"))
                .unwrap();
        assert_eq!(config.lint.quiet_interval_ms, 42);
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".pyeditrc.yml");
        fs::write(&config_path, "interpreter: python3").unwrap();

        let found = find_config(temp_dir.path()).unwrap();
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".pyeditrc.yml");
        fs::write(&config_path, "interpreter: python3").unwrap();

        let sub_dir = temp_dir.path().join("pkg").join("module");
        fs::create_dir_all(&sub_dir).unwrap();

        let found = find_config(&sub_dir).unwrap();
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_nearest_defaults_without_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        // Only meaningful when no config exists above the temp dir either
        if find_config(temp_dir.path()).unwrap().is_none() {
            let config = load_nearest(temp_dir.path()).unwrap();
            assert_eq!(config, IdeConfig::default());
        }
    }

    #[test]
    fn test_config_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();

        fs::write(temp_dir.path().join(".pyeditrc.yml"), "interpreter: a").unwrap();
        fs::write(
            temp_dir.path().join("pyedit.config.json"),
            r#"{"interpreter": "b"}"#,
        )
        .unwrap();

        let found = find_config(temp_dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".pyeditrc.yml");
    }
}
