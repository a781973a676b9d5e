use std::sync::Arc;

use tauri::AppHandle;

use crate::{
    backend_launch::LaunchPlan,
    backend_supervisor::ProcessSupervisor,
    config_resolver::ShellSettings,
    control_client::ControlClient,
    global_shortcut_registry::GlobalShortcutRegistry,
    shortcut_dispatcher::ShortcutDispatcher,
    window_actions::{AppShortcutTarget, MainWindowSurface},
    window_lifecycle::WindowLifecycleCoordinator,
    ShellResult,
};

/// Everything the running shell owns, managed as Tauri state.
pub(crate) struct ShellSession {
    pub(crate) settings: ShellSettings,
    pub(crate) supervisor: ProcessSupervisor,
    pub(crate) control: ControlClient,
    pub(crate) windows: WindowLifecycleCoordinator<MainWindowSurface>,
    pub(crate) shortcuts: ShortcutDispatcher,
    pub(crate) hotkeys: GlobalShortcutRegistry,
    pub(crate) shortcut_target: Arc<AppShortcutTarget>,
}

impl ShellSession {
    pub(crate) fn new(app_handle: &AppHandle, settings: ShellSettings) -> ShellResult<Self> {
        let control = ControlClient::new(&settings.control_base_url)?;
        Ok(Self {
            supervisor: ProcessSupervisor::default(),
            windows: WindowLifecycleCoordinator::new(MainWindowSurface::new(app_handle.clone())),
            shortcuts: ShortcutDispatcher::default(),
            hotkeys: GlobalShortcutRegistry::new(app_handle.clone()),
            shortcut_target: Arc::new(AppShortcutTarget::new(app_handle.clone(), control.clone())),
            control,
            settings,
        })
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.windows.is_quitting()
    }

    pub(crate) fn launch_plan(&self) -> LaunchPlan {
        LaunchPlan::from_settings(&self.settings.root_dir, &self.settings.deploy)
    }

    pub(crate) fn register_shortcuts(&self) {
        let failures = self.shortcuts.register_all(
            &self.hotkeys,
            &self.shortcut_target,
            &self.settings.shortcuts,
        );
        if !failures.is_empty() {
            tracing::warn!(
                failed = failures.len(),
                "some shortcuts are unavailable; the remaining bindings stay active"
            );
        }
    }

    pub(crate) fn request_close(&self) {
        self.windows.request_close(&self.supervisor);
    }

    /// Exit-path cleanup; runs when the event loop is already shutting down.
    pub(crate) fn release_resources(&self) {
        self.shortcuts.unregister_all(&self.hotkeys);
        if self.supervisor.is_alive() {
            crate::append_shutdown_log("backend still alive at exit; killing it");
            self.supervisor.force_kill_if_alive();
        }
    }
}
