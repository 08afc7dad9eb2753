use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

const EXECUTABLE_NAMES: &[&str] = &["python", "python3", "python2"];

#[cfg(windows)]
const EXECUTABLE_EXTENSIONS: &[&str] = &["", ".exe", ".bat"];
#[cfg(not(windows))]
const EXECUTABLE_EXTENSIONS: &[&str] = &[""];

/// Well-known install locations checked in addition to `PATH`.
fn common_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        "/usr/bin",
        "/usr/local/bin",
        "/opt/local/bin",
        "/opt/bin",
        "/bin",
        "/sbin",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    if let Some(home) = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) {
        let home = PathBuf::from(home);
        dirs.push(home.join("anaconda3").join("bin"));
        dirs.push(home.join(".local").join("bin"));
    }

    dirs
}

/// List Python interpreters found on `PATH` and in common install directories.
///
/// Results are canonicalised and de-duplicated, sorted by path.
#[must_use]
pub fn discover_interpreters() -> Vec<PathBuf> {
    let mut search_dirs: Vec<PathBuf> = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect())
        .unwrap_or_default();
    search_dirs.extend(common_dirs());

    discover_in(&search_dirs)
}

/// Same as [`discover_interpreters`] but restricted to the given directories.
#[must_use]
pub fn discover_in(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for dir in dirs {
        for name in EXECUTABLE_NAMES {
            for ext in EXECUTABLE_EXTENSIONS {
                let candidate = dir.join(format!("{name}{ext}"));
                if is_executable(&candidate) {
                    let resolved = candidate.canonicalize().unwrap_or(candidate);
                    found.insert(resolved);
                }
            }
        }
    }

    found.into_iter().collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
