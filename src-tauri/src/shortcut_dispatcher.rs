use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    append_shortcut_log,
    shortcut_config::{ShortcutAction, ShortcutBinding, ShortcutBindings, WindowShortcutAction},
    ControlCommand, ShellError, ShellResult,
};

pub(crate) type HotkeyHandler = Arc<dyn Fn() + Send + Sync>;

/// OS-level hotkey table. Handlers are invoked on key press only.
pub(crate) trait HotkeyRegistry {
    fn is_registered(&self, accelerator: &str) -> bool;
    fn register(&self, accelerator: &str, handler: HotkeyHandler) -> Result<(), String>;
    fn unregister(&self, accelerator: &str) -> Result<(), String>;
    fn unregister_all(&self) -> Result<(), String>;

    /// Key under which the registry considers two accelerators the same
    /// hotkey, e.g. `Ctrl+R` and `ctrl+r`.
    fn canonical_key(&self, accelerator: &str) -> String {
        normalize_accelerator(accelerator)
    }
}

pub(crate) fn normalize_accelerator(accelerator: &str) -> String {
    accelerator
        .split('+')
        .map(|part| part.trim().to_ascii_lowercase())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

/// What a pressed hotkey acts on.
pub(crate) trait ShortcutTarget: Send + Sync + 'static {
    fn send_control_command(&self, command: ControlCommand);
    fn is_main_window_focused(&self) -> bool;
    fn run_window_action(&self, action: WindowShortcutAction);
}

/// Runs `action` against `target`. Window-scoped actions are dropped while
/// the main window is unfocused; returns whether anything ran.
pub(crate) fn route_shortcut<T>(target: &T, action: ShortcutAction) -> bool
where
    T: ShortcutTarget + ?Sized,
{
    if let Some(command) = action.control_command() {
        target.send_control_command(command);
        return true;
    }

    let Some(window_action) = action.window_action() else {
        return false;
    };
    if !target.is_main_window_focused() {
        return false;
    }
    target.run_window_action(window_action);
    true
}

/// Canonical key -> (accelerator as configured, action).
type ActiveTable = BTreeMap<String, (String, ShortcutAction)>;

#[derive(Debug, Default)]
pub(crate) struct ShortcutDispatcher {
    active: Mutex<ActiveTable>,
}

impl ShortcutDispatcher {
    /// Registers every binding, globals first. Failures are logged and
    /// returned; the remaining bindings are still attempted.
    pub(crate) fn register_all<R, T>(
        &self,
        registry: &R,
        target: &Arc<T>,
        bindings: &ShortcutBindings,
    ) -> Vec<ShellError>
    where
        R: HotkeyRegistry + ?Sized,
        T: ShortcutTarget,
    {
        let mut failures = Vec::new();
        for binding in bindings.bindings() {
            if let Err(error) = self.register(registry, target, &binding) {
                tracing::warn!(category = "shortcut", "{error}");
                failures.push(error);
            }
        }

        let active = self.active_bindings();
        append_shortcut_log(&format!(
            "registered {} of {} shortcuts",
            active.len(),
            ShortcutAction::ALL.len()
        ));
        failures
    }

    pub(crate) fn register<R, T>(
        &self,
        registry: &R,
        target: &Arc<T>,
        binding: &ShortcutBinding,
    ) -> ShellResult<()>
    where
        R: HotkeyRegistry + ?Sized,
        T: ShortcutTarget,
    {
        let accelerator = binding.accelerator.as_str();
        let key = registry.canonical_key(accelerator);
        let failure = |reason: String| ShellError::ShortcutRegistrationFailure {
            action: binding.action.config_key(),
            accelerator: accelerator.to_string(),
            reason,
        };

        if registry.is_registered(accelerator) {
            registry
                .unregister(accelerator)
                .map_err(|error| failure(format!("could not release previous binding: {error}")))?;
        }
        if let Some((previous_accelerator, previous)) = self.lock_active().remove(&key) {
            tracing::debug!(
                accelerator,
                previous_accelerator,
                previous = previous.config_key(),
                "replacing shortcut binding"
            );
        }

        let action = binding.action;
        let handler_target = Arc::clone(target);
        let handler: HotkeyHandler = Arc::new(move || {
            if !route_shortcut(handler_target.as_ref(), action) {
                tracing::debug!(action = action.config_key(), "shortcut ignored: window not focused");
            }
        });
        registry.register(accelerator, handler).map_err(failure)?;

        self.lock_active()
            .insert(key, (accelerator.to_string(), action));
        tracing::debug!(accelerator, action = action.config_key(), "shortcut registered");
        Ok(())
    }

    pub(crate) fn unregister_all<R>(&self, registry: &R)
    where
        R: HotkeyRegistry + ?Sized,
    {
        if let Err(error) = registry.unregister_all() {
            tracing::warn!("failed to unregister shortcuts: {error}");
        }
        self.lock_active().clear();
    }

    pub(crate) fn active_bindings(&self) -> Vec<(String, ShortcutAction)> {
        self.lock_active()
            .values()
            .map(|(accelerator, action)| (accelerator.clone(), *action))
            .collect()
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, ActiveTable> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        sync::atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::shortcut_config::merge_with_defaults;

    #[derive(Default)]
    struct FakeRegistry {
        handlers: Mutex<HashMap<String, HotkeyHandler>>,
        refused: HashSet<String>,
    }

    impl FakeRegistry {
        fn refusing(accelerators: &[&str]) -> Self {
            Self {
                refused: accelerators.iter().map(|value| value.to_string()).collect(),
                ..Self::default()
            }
        }

        fn press(&self, accelerator: &str) {
            let handler = self
                .handlers
                .lock()
                .unwrap()
                .get(&normalize_accelerator(accelerator))
                .cloned();
            if let Some(handler) = handler {
                handler();
            }
        }

        fn registered(&self) -> usize {
            self.handlers.lock().unwrap().len()
        }
    }

    impl HotkeyRegistry for FakeRegistry {
        fn is_registered(&self, accelerator: &str) -> bool {
            self.handlers
                .lock()
                .unwrap()
                .contains_key(&normalize_accelerator(accelerator))
        }

        fn register(&self, accelerator: &str, handler: HotkeyHandler) -> Result<(), String> {
            if self.refused.contains(accelerator) {
                return Err("hotkey already registered by another application".to_string());
            }
            let key = normalize_accelerator(accelerator);
            let mut handlers = self.handlers.lock().unwrap();
            if handlers.contains_key(&key) {
                return Err(format!("{accelerator} is already registered"));
            }
            handlers.insert(key, handler);
            Ok(())
        }

        fn unregister(&self, accelerator: &str) -> Result<(), String> {
            self.handlers
                .lock()
                .unwrap()
                .remove(&normalize_accelerator(accelerator));
            Ok(())
        }

        fn unregister_all(&self) -> Result<(), String> {
            self.handlers.lock().unwrap().clear();
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeTarget {
        focused: AtomicBool,
        commands: Mutex<Vec<ControlCommand>>,
        window_actions: Mutex<Vec<WindowShortcutAction>>,
    }

    impl ShortcutTarget for FakeTarget {
        fn send_control_command(&self, command: ControlCommand) {
            self.commands.lock().unwrap().push(command);
        }

        fn is_main_window_focused(&self) -> bool {
            self.focused.load(Ordering::SeqCst)
        }

        fn run_window_action(&self, action: WindowShortcutAction) {
            self.window_actions.lock().unwrap().push(action);
        }
    }

    fn binding(action: ShortcutAction, accelerator: &str) -> ShortcutBinding {
        ShortcutBinding {
            action,
            accelerator: accelerator.to_string(),
            scope: action.scope(),
        }
    }

    #[test]
    fn defaults_register_every_action() {
        let registry = FakeRegistry::default();
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();

        let failures =
            dispatcher.register_all(&registry, &target, &ShortcutBindings::defaults());
        assert!(failures.is_empty());
        assert_eq!(registry.registered(), ShortcutAction::ALL.len());

        registry.press("F9");
        registry.press("Ctrl+F12");
        assert_eq!(
            *target.commands.lock().unwrap(),
            vec![ControlCommand::Start, ControlCommand::Rotate]
        );
    }

    #[test]
    fn later_binding_on_same_accelerator_wins() {
        let registry = FakeRegistry::default();
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();

        dispatcher
            .register(&registry, &target, &binding(ShortcutAction::Start, "F7"))
            .expect("first registration");
        dispatcher
            .register(&registry, &target, &binding(ShortcutAction::Stop, "F7"))
            .expect("re-registration");

        registry.press("F7");
        assert_eq!(*target.commands.lock().unwrap(), vec![ControlCommand::Stop]);
        assert_eq!(
            dispatcher.active_bindings(),
            vec![("F7".to_string(), ShortcutAction::Stop)]
        );
    }

    #[test]
    fn differently_cased_accelerator_replaces_existing_binding() {
        let registry = FakeRegistry::default();
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();

        dispatcher
            .register(&registry, &target, &binding(ShortcutAction::Refresh, "Ctrl+R"))
            .expect("refresh");
        dispatcher
            .register(&registry, &target, &binding(ShortcutAction::HardRefresh, "ctrl + r"))
            .expect("hard refresh");

        assert_eq!(registry.registered(), 1);
        assert_eq!(
            dispatcher.active_bindings(),
            vec![("ctrl + r".to_string(), ShortcutAction::HardRefresh)]
        );

        target.focused.store(true, Ordering::SeqCst);
        registry.press("Ctrl+R");
        assert_eq!(
            *target.window_actions.lock().unwrap(),
            vec![WindowShortcutAction::HardReload]
        );
    }

    #[test]
    fn accelerators_normalize_case_and_spacing() {
        assert_eq!(normalize_accelerator(" Ctrl + Shift+I "), "ctrl+shift+i");
        assert_eq!(normalize_accelerator("F9"), "f9");
    }

    #[test]
    fn refused_accelerator_does_not_block_others() {
        let registry = FakeRegistry::refusing(&["F10"]);
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();

        let failures =
            dispatcher.register_all(&registry, &target, &ShortcutBindings::defaults());
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            ShellError::ShortcutRegistrationFailure { action: "STOP", accelerator, .. }
                if accelerator == "F10"
        ));
        assert_eq!(registry.registered(), ShortcutAction::ALL.len() - 1);

        registry.press("F11");
        assert_eq!(
            *target.commands.lock().unwrap(),
            vec![ControlCommand::Restart]
        );
    }

    #[test]
    fn window_shortcuts_require_focus() {
        let registry = FakeRegistry::default();
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();
        dispatcher.register_all(&registry, &target, &ShortcutBindings::defaults());

        registry.press("Ctrl+R");
        registry.press("Ctrl+Shift+I");
        assert!(target.window_actions.lock().unwrap().is_empty());

        target.focused.store(true, Ordering::SeqCst);
        registry.press("Ctrl+Shift+R");
        registry.press("Ctrl+Shift+I");
        assert_eq!(
            *target.window_actions.lock().unwrap(),
            vec![
                WindowShortcutAction::HardReload,
                WindowShortcutAction::ToggleDevTools
            ]
        );
        assert!(target.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn global_shortcuts_fire_without_focus() {
        let target = FakeTarget::default();
        assert!(route_shortcut(&target, ShortcutAction::Update));
        assert!(!route_shortcut(&target, ShortcutAction::Refresh));
        assert_eq!(*target.commands.lock().unwrap(), vec![ControlCommand::Update]);
    }

    #[test]
    fn user_override_moves_action_to_new_accelerator() {
        let registry = FakeRegistry::default();
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();
        let (bindings, warnings) = merge_with_defaults([("START", Some("F7"))]);
        assert!(warnings.is_empty());

        dispatcher.register_all(&registry, &target, &bindings);
        registry.press("F9");
        registry.press("F7");
        assert_eq!(*target.commands.lock().unwrap(), vec![ControlCommand::Start]);
    }

    #[test]
    fn unregister_all_clears_table() {
        let registry = FakeRegistry::default();
        let target = Arc::new(FakeTarget::default());
        let dispatcher = ShortcutDispatcher::default();
        dispatcher.register_all(&registry, &target, &ShortcutBindings::defaults());

        dispatcher.unregister_all(&registry);
        assert_eq!(registry.registered(), 0);
        assert!(dispatcher.active_bindings().is_empty());
        registry.press("F9");
        assert!(target.commands.lock().unwrap().is_empty());
    }
}
