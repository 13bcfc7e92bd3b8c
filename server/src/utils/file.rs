//! Config file discovery

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME};

/// Expand `~`, `~/...` and relative paths to an absolute path.
///
/// ```text
/// expand_path("~/.tidewatch/tidewatch.json") // -> /home/user/.tidewatch/tidewatch.json
/// expand_path("./tidewatch.json")            // -> /current/dir/./tidewatch.json
/// expand_path("/etc/tidewatch.json")         // unchanged
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let home_relative = match path.strip_prefix('~') {
        Some("") => Some(""),
        Some(rest) => rest.strip_prefix('/'),
        None => None,
    };
    let expanded = match (home_relative, dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Per-user config file (`~/.tidewatch/tidewatch.json`)
pub fn profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Config file layered over the profile one.
///
/// An explicit path must exist. Without one, `tidewatch.json` in the
/// working directory is used when present.
pub fn overlay_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Ok(Some(expanded))
        }
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            Ok(local.exists().then_some(local))
        }
    }
}
