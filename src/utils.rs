//! Path helpers shared by config loading and log output.

use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Other paths, and `~` when no home directory is known, are returned as-is.
///
/// # Examples
/// ```
/// use iftarr::utils::expand_tilde;
/// assert_eq!(expand_tilde("/etc/cal.json"), std::path::PathBuf::from("/etc/cal.json"));
/// ```
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(path),
    };

    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Shorten a path under the home directory to `~/...` for display.
pub fn path_for_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}
