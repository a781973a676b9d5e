//! Resolves everything the shell needs from the NKAS checkout before any
//! window exists. Bad or missing files never abort startup: each problem is
//! logged and the affected values fall back to defaults.

use std::{env, path::PathBuf};

use crate::{
    deploy_config::{self, DeploySettings},
    runtime_paths,
    shortcut_config::{self, ShortcutBindings},
    ShellError, UI_REVEAL_ENV,
};

/// When the main window is first shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum UiRevealPolicy {
    #[default]
    WaitForReadiness,
    Immediate,
}

impl UiRevealPolicy {
    pub(crate) fn from_env_value(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("immediate") => Self::Immediate,
            Some("ready") | Some("") | None => Self::WaitForReadiness,
            Some(other) => {
                tracing::warn!("unknown {UI_REVEAL_ENV} value '{other}'; waiting for readiness");
                Self::WaitForReadiness
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ShellSettings {
    pub(crate) root_dir: PathBuf,
    pub(crate) deploy: DeploySettings,
    pub(crate) shortcuts: ShortcutBindings,
    pub(crate) reveal_policy: UiRevealPolicy,
    pub(crate) control_base_url: String,
}

pub(crate) fn resolve_shell_settings(root_dir: PathBuf) -> ShellSettings {
    let deploy_path = runtime_paths::deploy_config_path(&root_dir);
    let (deploy, deploy_issue) = deploy_config::load_deploy_settings(&root_dir, &deploy_path);
    report_config_issue(deploy_issue);

    let shortcut_load =
        shortcut_config::load_shortcut_bindings(&runtime_paths::shortcuts_config_path(&root_dir));
    report_config_issue(shortcut_load.issue);
    for warning in &shortcut_load.warnings {
        tracing::warn!(category = "shortcut", "{warning}");
    }

    let reveal_policy = UiRevealPolicy::from_env_value(env::var(UI_REVEAL_ENV).ok().as_deref());
    let control_base_url = deploy.control_base_url();
    tracing::info!(
        root = %root_dir.display(),
        python = %deploy.python_executable.display(),
        port = %deploy.webui_port,
        dpi_scaling = deploy.dpi_scaling,
        reveal = ?reveal_policy,
        "shell settings resolved"
    );

    ShellSettings {
        root_dir,
        deploy,
        shortcuts: shortcut_load.bindings,
        reveal_policy,
        control_base_url,
    }
}

fn report_config_issue(issue: Option<ShellError>) {
    match issue {
        Some(error) if error.is_config_missing() => {
            tracing::warn!("{error}; using defaults")
        }
        Some(error) => tracing::error!("{error}; using defaults"),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::shortcut_config::ShortcutAction;

    #[test]
    fn reveal_policy_parses_env_values() {
        assert_eq!(UiRevealPolicy::from_env_value(None), UiRevealPolicy::WaitForReadiness);
        assert_eq!(
            UiRevealPolicy::from_env_value(Some(" Immediate ")),
            UiRevealPolicy::Immediate
        );
        assert_eq!(
            UiRevealPolicy::from_env_value(Some("ready")),
            UiRevealPolicy::WaitForReadiness
        );
        assert_eq!(
            UiRevealPolicy::from_env_value(Some("eventually")),
            UiRevealPolicy::WaitForReadiness
        );
    }

    #[test]
    fn empty_root_resolves_to_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings = resolve_shell_settings(temp.path().to_path_buf());

        assert_eq!(settings.deploy, DeploySettings::defaults(temp.path()));
        assert_eq!(settings.shortcuts, ShortcutBindings::defaults());
        assert_eq!(settings.control_base_url, "http://127.0.0.1:22267");
    }

    #[test]
    fn config_files_are_read_from_config_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config_dir = temp.path().join("config");
        fs::create_dir_all(&config_dir).expect("config dir");
        fs::write(
            config_dir.join("deploy.yaml"),
            "Deploy:\n  Webui:\n    WebuiPort: 12345\n    DpiScaling: false\n",
        )
        .expect("deploy.yaml");
        fs::write(config_dir.join("shortcuts.yaml"), "START: F7\n").expect("shortcuts.yaml");

        let settings = resolve_shell_settings(temp.path().to_path_buf());
        assert_eq!(settings.control_base_url, "http://127.0.0.1:12345");
        assert!(!settings.deploy.dpi_scaling);
        assert_eq!(settings.shortcuts.accelerator(ShortcutAction::Start), Some("F7"));
        assert_eq!(settings.shortcuts.accelerator(ShortcutAction::Stop), Some("F10"));
    }
}
