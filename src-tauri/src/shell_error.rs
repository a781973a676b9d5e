//! Error taxonomy for the desktop shell.
//!
//! None of these variants terminate the shell on their own. Each is handled
//! where it occurs (logged, then defaults or partial results are used). The
//! only deliberate exit is the single-instance denial, which the plugin
//! performs before any UI exists.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for core shell components.
pub(crate) type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Error)]
pub(crate) enum ShellError {
    /// A configuration file is absent; defaults are used.
    #[error("configuration file {} not found", path.display())]
    ConfigMissing { path: PathBuf },

    /// A configuration file exists but could not be parsed; defaults are used.
    #[error("configuration file {} is invalid: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// The backend process could not be started.
    #[error("failed to spawn backend process: {0}")]
    SpawnFailure(String),

    /// A start was requested while a backend process is still alive.
    #[error("backend process is already running")]
    BackendAlreadyRunning,

    /// A control API request failed at the network or decoding level.
    #[error("control command '{command}' failed: {reason}")]
    ControlCommandFailure {
        command: &'static str,
        reason: String,
    },

    /// The OS refused (or could not parse) a hotkey binding.
    #[error("failed to register shortcut {accelerator} for {action}: {reason}")]
    ShortcutRegistrationFailure {
        action: &'static str,
        accelerator: String,
        reason: String,
    },

    /// Another shell process already holds the instance lock.
    #[error("another NKAS desktop instance is already running")]
    SecondInstanceDenied,
}

impl ShellError {
    pub(crate) fn is_config_missing(&self) -> bool {
        matches!(self, Self::ConfigMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_display_path() {
        let missing = ShellError::ConfigMissing {
            path: PathBuf::from("config/shortcuts.yaml"),
        };
        assert!(missing.to_string().contains("config/shortcuts.yaml"));
        assert!(missing.is_config_missing());

        let invalid = ShellError::ConfigInvalid {
            path: PathBuf::from("config/deploy.yaml"),
            reason: "expected a mapping".to_string(),
        };
        let message = invalid.to_string();
        assert!(message.contains("config/deploy.yaml"));
        assert!(message.contains("expected a mapping"));
        assert!(!invalid.is_config_missing());
    }

    #[test]
    fn shortcut_failure_names_action_and_accelerator() {
        let error = ShellError::ShortcutRegistrationFailure {
            action: "START",
            accelerator: "F9".to_string(),
            reason: "already claimed".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to register shortcut F9 for START: already claimed"
        );
    }
}
