//! Path validation and home-directory expansion.

use std::path::{Path, PathBuf};

/// Validates that a path string is not empty or just whitespace
pub fn validate_path_str(path_str: &str) -> Result<(), String> {
    if path_str.trim().is_empty() {
        return Err("Path cannot be empty or contain only whitespace".to_string());
    }
    Ok(())
}

/// Expands a leading `~` or `$HOME` to the user's home directory.
///
/// Paths without a home reference are returned unchanged. If the home
/// directory cannot be determined the path is also returned unchanged;
/// callers treat the result as an ordinary (possibly missing) path.
pub fn expand_home(path_str: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path_str);
    };
    if path_str == "~" || path_str == "$HOME" {
        return home;
    }
    if let Some(rest) = path_str.strip_prefix("~/") {
        return home.join(rest);
    }
    if let Some(rest) = path_str.strip_prefix("$HOME/") {
        return home.join(rest);
    }
    PathBuf::from(path_str)
}

/// Safely gets the parent directory for creating directories.
/// Returns None for paths that don't need directory creation (like "config.json" in current dir)
pub fn safe_parent_for_creation(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
