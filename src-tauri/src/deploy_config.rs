use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_yaml::Value;

use crate::{
    runtime_paths, ShellError, BACKEND_ENTRY_SCRIPT, CONTROL_API_HOST, DEFAULT_PYTHON_EXECUTABLE,
    DEFAULT_WEBUI_PORT,
};

/// Normalized deployment settings consumed by the supervisor and the
/// control client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeploySettings {
    pub(crate) python_executable: PathBuf,
    pub(crate) entry_script: String,
    pub(crate) webui_port: String,
    pub(crate) dpi_scaling: bool,
}

impl DeploySettings {
    pub(crate) fn defaults(root_dir: &Path) -> Self {
        Self {
            python_executable: runtime_paths::resolve_executable_path(
                root_dir,
                DEFAULT_PYTHON_EXECUTABLE,
            ),
            entry_script: BACKEND_ENTRY_SCRIPT.to_string(),
            webui_port: DEFAULT_WEBUI_PORT.to_string(),
            dpi_scaling: true,
        }
    }

    pub(crate) fn control_base_url(&self) -> String {
        format!("http://{CONTROL_API_HOST}:{}", self.webui_port)
    }
}

/// Reads `<root>/config/deploy.yaml`. The returned settings are always
/// usable; the optional error says why defaults were (partly) applied.
pub(crate) fn load_deploy_settings(
    root_dir: &Path,
    config_path: &Path,
) -> (DeploySettings, Option<ShellError>) {
    let raw = match fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return (
                DeploySettings::defaults(root_dir),
                Some(ShellError::ConfigMissing {
                    path: config_path.to_path_buf(),
                }),
            );
        }
        Err(error) => {
            return (
                DeploySettings::defaults(root_dir),
                Some(ShellError::ConfigInvalid {
                    path: config_path.to_path_buf(),
                    reason: format!("failed to read file: {error}"),
                }),
            );
        }
    };

    match parse_deploy_settings(root_dir, &raw) {
        Ok((settings, field_issues)) if field_issues.is_empty() => (settings, None),
        Ok((settings, field_issues)) => (
            settings,
            Some(ShellError::ConfigInvalid {
                path: config_path.to_path_buf(),
                reason: field_issues.join("; "),
            }),
        ),
        Err(reason) => (
            DeploySettings::defaults(root_dir),
            Some(ShellError::ConfigInvalid {
                path: config_path.to_path_buf(),
                reason,
            }),
        ),
    }
}

/// Fails only when the document itself is not YAML. Each field is resolved
/// on its own: a bad value falls back to that field's default and is
/// reported in the returned issue list.
pub(crate) fn parse_deploy_settings(
    root_dir: &Path,
    raw: &str,
) -> Result<(DeploySettings, Vec<String>), String> {
    let defaults = DeploySettings::defaults(root_dir);
    if raw.trim().is_empty() {
        return Ok((defaults, Vec::new()));
    }

    let document: Value = serde_yaml::from_str(raw).map_err(|error| error.to_string())?;
    let deploy = document.get("Deploy");
    let python = deploy.and_then(|section| section.get("Python"));
    let webui = deploy.and_then(|section| section.get("Webui"));
    let mut issues = Vec::new();

    let python_executable = match python.and_then(|section| section.get("PythonExecutable")) {
        None | Some(Value::Null) => defaults.python_executable,
        Some(Value::String(text)) if text.trim().is_empty() => defaults.python_executable,
        Some(Value::String(text)) => runtime_paths::resolve_executable_path(root_dir, text.trim()),
        Some(other) => {
            issues.push(format!("PythonExecutable must be a path string, got {other:?}"));
            defaults.python_executable
        }
    };
    let webui_port = match webui.and_then(|section| section.get("WebuiPort")) {
        None | Some(Value::Null) => defaults.webui_port,
        Some(value) => coerce_port(value).unwrap_or_else(|reason| {
            issues.push(reason);
            defaults.webui_port
        }),
    };
    let dpi_scaling = match webui.and_then(|section| section.get("DpiScaling")) {
        None | Some(Value::Null) => defaults.dpi_scaling,
        Some(Value::Bool(enabled)) => *enabled,
        Some(other) => {
            issues.push(format!("DpiScaling must be true or false, got {other:?}"));
            defaults.dpi_scaling
        }
    };

    Ok((
        DeploySettings {
            python_executable,
            entry_script: defaults.entry_script,
            webui_port,
            dpi_scaling,
        },
        issues,
    ))
}

fn coerce_port(value: &Value) -> Result<String, String> {
    let port = match value {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| format!("WebuiPort must be a positive integer, got {number}"))?,
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("WebuiPort must be numeric, got '{text}'"))?,
        other => return Err(format!("WebuiPort must be numeric, got {other:?}")),
    };
    if port == 0 || port > u64::from(u16::MAX) {
        return Err(format!("WebuiPort {port} is out of range"));
    }
    Ok(port.to_string())
}
