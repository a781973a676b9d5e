use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{CONFIG_DIR, DEPLOY_CONFIG_FILE, ROOT_DIR_ENV, SHORTCUTS_CONFIG_FILE};

/// Root of the NKAS checkout the shell manages. `NKAS_ROOT` wins over the
/// working directory.
pub(crate) fn default_root_dir() -> PathBuf {
    root_dir_from(env::var(ROOT_DIR_ENV).ok().as_deref(), env::current_dir().ok())
}

fn root_dir_from(env_value: Option<&str>, current_dir: Option<PathBuf>) -> PathBuf {
    if let Some(raw) = env_value {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    current_dir.unwrap_or_else(|| PathBuf::from("."))
}

pub(crate) fn deploy_config_path(root_dir: &Path) -> PathBuf {
    root_dir.join(CONFIG_DIR).join(DEPLOY_CONFIG_FILE)
}

pub(crate) fn shortcuts_config_path(root_dir: &Path) -> PathBuf {
    root_dir.join(CONFIG_DIR).join(SHORTCUTS_CONFIG_FILE)
}

/// Relative executables in the deploy descriptor are written relative to the
/// directory above the checkout.
pub(crate) fn resolve_executable_path(root_dir: &Path, raw: &str) -> PathBuf {
    let candidate = PathBuf::from(raw.trim());
    if candidate.is_absolute() {
        return candidate;
    }

    let anchor = root_dir.parent().unwrap_or(root_dir);
    let relative = candidate.strip_prefix(".").unwrap_or(&candidate);
    anchor.join(relative)
}
