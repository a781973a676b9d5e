//! Hotkey bindings: the closed action set, built-in defaults and the merge
//! of `config/shortcuts.yaml` over them.

use std::{collections::BTreeMap, fs, io, path::Path};

use serde_yaml::Value;

use crate::{ControlCommand, ShellError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum ShortcutAction {
    Start,
    Stop,
    Restart,
    Update,
    Rotate,
    ToggleDevTools,
    Refresh,
    HardRefresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShortcutScope {
    Global,
    FocusedWindowOnly,
}

/// Local window actions reachable from conditional hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowShortcutAction {
    ToggleDevTools,
    Reload,
    HardReload,
}

impl ShortcutAction {
    pub(crate) const ALL: [Self; 8] = [
        Self::Start,
        Self::Stop,
        Self::Restart,
        Self::Update,
        Self::Rotate,
        Self::ToggleDevTools,
        Self::Refresh,
        Self::HardRefresh,
    ];

    pub(crate) fn config_key(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Restart => "RESTART",
            Self::Update => "UPDATE",
            Self::Rotate => "ROTATE",
            Self::ToggleDevTools => "DEV_TOOLS",
            Self::Refresh => "REFRESH",
            Self::HardRefresh => "HARD_REFRESH",
        }
    }

    pub(crate) fn from_config_key(raw: &str) -> Option<Self> {
        let key = raw.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.config_key().eq_ignore_ascii_case(key))
    }

    pub(crate) fn default_accelerator(self) -> &'static str {
        match self {
            Self::Start => "F9",
            Self::Stop => "F10",
            Self::Restart => "F11",
            Self::Update => "F8",
            Self::Rotate => "Ctrl+F12",
            Self::ToggleDevTools => "Ctrl+Shift+I",
            Self::Refresh => "Ctrl+R",
            Self::HardRefresh => "Ctrl+Shift+R",
        }
    }

    pub(crate) fn scope(self) -> ShortcutScope {
        if self.control_command().is_some() {
            ShortcutScope::Global
        } else {
            ShortcutScope::FocusedWindowOnly
        }
    }

    pub(crate) fn control_command(self) -> Option<ControlCommand> {
        match self {
            Self::Start => Some(ControlCommand::Start),
            Self::Stop => Some(ControlCommand::Stop),
            Self::Restart => Some(ControlCommand::Restart),
            Self::Update => Some(ControlCommand::Update),
            Self::Rotate => Some(ControlCommand::Rotate),
            Self::ToggleDevTools | Self::Refresh | Self::HardRefresh => None,
        }
    }

    pub(crate) fn window_action(self) -> Option<WindowShortcutAction> {
        match self {
            Self::ToggleDevTools => Some(WindowShortcutAction::ToggleDevTools),
            Self::Refresh => Some(WindowShortcutAction::Reload),
            Self::HardRefresh => Some(WindowShortcutAction::HardReload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShortcutBinding {
    pub(crate) action: ShortcutAction,
    pub(crate) accelerator: String,
    pub(crate) scope: ShortcutScope,
}

/// Active bindings keyed by action; inserting an action twice keeps the
/// later accelerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShortcutBindings {
    accelerators: BTreeMap<ShortcutAction, String>,
}

impl ShortcutBindings {
    pub(crate) fn defaults() -> Self {
        Self {
            accelerators: ShortcutAction::ALL
                .into_iter()
                .map(|action| (action, action.default_accelerator().to_string()))
                .collect(),
        }
    }

    pub(crate) fn set(&mut self, action: ShortcutAction, accelerator: impl Into<String>) {
        self.accelerators.insert(action, accelerator.into());
    }

    #[cfg(test)]
    pub(crate) fn accelerator(&self, action: ShortcutAction) -> Option<&str> {
        self.accelerators.get(&action).map(String::as_str)
    }

    /// Global bindings come first so backend controls are claimed before the
    /// window-scoped ones.
    pub(crate) fn bindings(&self) -> Vec<ShortcutBinding> {
        let mut bindings: Vec<ShortcutBinding> = self
            .accelerators
            .iter()
            .map(|(action, accelerator)| ShortcutBinding {
                action: *action,
                accelerator: accelerator.clone(),
                scope: action.scope(),
            })
            .collect();
        bindings.sort_by_key(|binding| (binding.scope != ShortcutScope::Global, binding.action));
        bindings
    }
}

/// Overlays user entries on the defaults, key by key. Entries that do not
/// name a known action or carry no accelerator string are skipped and
/// returned as warnings.
pub(crate) fn merge_with_defaults<'a, I>(entries: I) -> (ShortcutBindings, Vec<String>)
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut bindings = ShortcutBindings::defaults();
    let mut warnings = Vec::new();

    for (key, accelerator) in entries {
        let Some(action) = ShortcutAction::from_config_key(key) else {
            warnings.push(format!("unknown shortcut action '{key}' ignored"));
            continue;
        };
        match accelerator.map(str::trim).filter(|value| !value.is_empty()) {
            Some(accelerator) => bindings.set(action, accelerator),
            None => warnings.push(format!(
                "shortcut '{key}' has no accelerator string; keeping default {}",
                action.default_accelerator()
            )),
        }
    }

    (bindings, warnings)
}

pub(crate) fn parse_shortcut_bindings(raw: &str) -> Result<(ShortcutBindings, Vec<String>), String> {
    let document: Value = serde_yaml::from_str(raw).map_err(|error| error.to_string())?;
    let mapping = match document {
        Value::Null => return Ok((ShortcutBindings::defaults(), Vec::new())),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(format!(
                "expected a mapping of action to accelerator, got {}",
                describe_yaml_kind(&other)
            ))
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    let mut warnings = Vec::new();
    for (key, value) in &mapping {
        let Some(key) = key.as_str() else {
            warnings.push(format!("non-string shortcut key {key:?} ignored"));
            continue;
        };
        entries.push((key, value.as_str()));
    }

    let (bindings, merge_warnings) = merge_with_defaults(entries);
    warnings.extend(merge_warnings);
    Ok((bindings, warnings))
}

fn describe_yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Outcome of reading the hotkey descriptor.
#[derive(Debug)]
pub(crate) struct ShortcutLoad {
    pub(crate) bindings: ShortcutBindings,
    pub(crate) issue: Option<ShellError>,
    pub(crate) warnings: Vec<String>,
}

pub(crate) fn load_shortcut_bindings(config_path: &Path) -> ShortcutLoad {
    let raw = match fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(error) => {
            let issue = if error.kind() == io::ErrorKind::NotFound {
                ShellError::ConfigMissing {
                    path: config_path.to_path_buf(),
                }
            } else {
                ShellError::ConfigInvalid {
                    path: config_path.to_path_buf(),
                    reason: format!("failed to read file: {error}"),
                }
            };
            return ShortcutLoad {
                bindings: ShortcutBindings::defaults(),
                issue: Some(issue),
                warnings: Vec::new(),
            };
        }
    };

    match parse_shortcut_bindings(&raw) {
        Ok((bindings, warnings)) => ShortcutLoad {
            bindings,
            issue: None,
            warnings,
        },
        Err(reason) => ShortcutLoad {
            bindings: ShortcutBindings::defaults(),
            issue: Some(ShellError::ConfigInvalid {
                path: config_path.to_path_buf(),
                reason,
            }),
            warnings: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_descriptor_yields_exact_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let load = load_shortcut_bindings(&temp.path().join("shortcuts.yaml"));
        assert_eq!(load.bindings, ShortcutBindings::defaults());
        assert!(matches!(load.issue, Some(ShellError::ConfigMissing { .. })));

        let defaults = load.bindings;
        assert_eq!(defaults.accelerator(ShortcutAction::Start), Some("F9"));
        assert_eq!(defaults.accelerator(ShortcutAction::Stop), Some("F10"));
        assert_eq!(defaults.accelerator(ShortcutAction::Restart), Some("F11"));
        assert_eq!(defaults.accelerator(ShortcutAction::Update), Some("F8"));
        assert_eq!(defaults.accelerator(ShortcutAction::Rotate), Some("Ctrl+F12"));
        assert_eq!(
            defaults.accelerator(ShortcutAction::ToggleDevTools),
            Some("Ctrl+Shift+I")
        );
        assert_eq!(defaults.accelerator(ShortcutAction::Refresh), Some("Ctrl+R"));
        assert_eq!(
            defaults.accelerator(ShortcutAction::HardRefresh),
            Some("Ctrl+Shift+R")
        );
    }

    #[test]
    fn user_entry_overrides_only_its_action() {
        let (bindings, warnings) = parse_shortcut_bindings("START: F7\n").expect("valid yaml");
        assert!(warnings.is_empty());
        assert_eq!(bindings.accelerator(ShortcutAction::Start), Some("F7"));
        for action in ShortcutAction::ALL
            .into_iter()
            .filter(|action| *action != ShortcutAction::Start)
        {
            assert_eq!(
                bindings.accelerator(action),
                Some(action.default_accelerator())
            );
        }
    }

    #[test]
    fn malformed_descriptor_falls_back_to_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("shortcuts.yaml");
        fs::write(&path, "START: [F7\n").expect("write fixture");
        let load = load_shortcut_bindings(&path);
        assert_eq!(load.bindings, ShortcutBindings::defaults());
        assert!(matches!(load.issue, Some(ShellError::ConfigInvalid { .. })));
    }

    #[test]
    fn non_mapping_root_is_invalid() {
        let error = parse_shortcut_bindings("- F7\n- F8\n").expect_err("sequence root");
        assert!(error.contains("a sequence"));
    }

    #[test]
    fn empty_descriptor_is_defaults_without_issue() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("shortcuts.yaml");
        fs::write(&path, "").expect("write fixture");
        let load = load_shortcut_bindings(&path);
        assert_eq!(load.bindings, ShortcutBindings::defaults());
        assert!(load.issue.is_none());
    }

    #[test]
    fn unknown_and_empty_entries_are_skipped_with_warnings() {
        let (bindings, warnings) =
            merge_with_defaults([("JUMP", Some("F1")), ("stop", Some("  ")), ("rotate", None)]);
        assert_eq!(bindings, ShortcutBindings::defaults());
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("JUMP"));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let (bindings, _) = merge_with_defaults([("hard_refresh", Some("F5"))]);
        assert_eq!(bindings.accelerator(ShortcutAction::HardRefresh), Some("F5"));
    }

    #[test]
    fn later_duplicate_for_same_action_wins() {
        let (bindings, _) = merge_with_defaults([("START", Some("F1")), ("Start", Some("F2"))]);
        assert_eq!(bindings.accelerator(ShortcutAction::Start), Some("F2"));
    }

    #[test]
    fn bindings_list_global_actions_first() {
        let bindings = ShortcutBindings::defaults().bindings();
        let scopes: Vec<ShortcutScope> = bindings.iter().map(|binding| binding.scope).collect();
        assert_eq!(&scopes[..5], &[ShortcutScope::Global; 5]);
        assert_eq!(&scopes[5..], &[ShortcutScope::FocusedWindowOnly; 3]);
        assert_eq!(bindings[0].action, ShortcutAction::Start);
    }

    #[test]
    fn actions_route_to_commands_or_window_actions() {
        assert_eq!(
            ShortcutAction::Rotate.control_command(),
            Some(ControlCommand::Rotate)
        );
        assert_eq!(ShortcutAction::Rotate.window_action(), None);
        assert_eq!(ShortcutAction::Refresh.control_command(), None);
        assert_eq!(
            ShortcutAction::HardRefresh.window_action(),
            Some(WindowShortcutAction::HardReload)
        );
    }
}
