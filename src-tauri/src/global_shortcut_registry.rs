use std::str::FromStr;

use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use crate::shortcut_dispatcher::{normalize_accelerator, HotkeyHandler, HotkeyRegistry};

/// `HotkeyRegistry` backed by the global-shortcut plugin.
pub(crate) struct GlobalShortcutRegistry {
    app_handle: AppHandle,
}

impl GlobalShortcutRegistry {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

fn parse_accelerator(accelerator: &str) -> Result<Shortcut, String> {
    Shortcut::from_str(accelerator)
        .map_err(|error| format!("cannot parse accelerator '{accelerator}': {error}"))
}

impl HotkeyRegistry for GlobalShortcutRegistry {
    fn is_registered(&self, accelerator: &str) -> bool {
        parse_accelerator(accelerator)
            .map(|shortcut| self.app_handle.global_shortcut().is_registered(shortcut))
            .unwrap_or(false)
    }

    fn register(&self, accelerator: &str, handler: HotkeyHandler) -> Result<(), String> {
        let shortcut = parse_accelerator(accelerator)?;
        self.app_handle
            .global_shortcut()
            .on_shortcut(shortcut, move |_app, _shortcut, event| {
                if event.state == ShortcutState::Pressed {
                    handler();
                }
            })
            .map_err(|error| error.to_string())
    }

    fn unregister(&self, accelerator: &str) -> Result<(), String> {
        let shortcut = parse_accelerator(accelerator)?;
        self.app_handle
            .global_shortcut()
            .unregister(shortcut)
            .map_err(|error| error.to_string())
    }

    fn unregister_all(&self) -> Result<(), String> {
        self.app_handle
            .global_shortcut()
            .unregister_all()
            .map_err(|error| error.to_string())
    }

    fn canonical_key(&self, accelerator: &str) -> String {
        canonical_shortcut_key(accelerator)
    }
}

/// Parsed form, so aliases like `Control`/`Ctrl` collapse to one key.
fn canonical_shortcut_key(accelerator: &str) -> String {
    parse_accelerator(accelerator)
        .map(Shortcut::into_string)
        .unwrap_or_else(|_| normalize_accelerator(accelerator))
}
