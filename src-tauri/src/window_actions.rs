use tauri::{AppHandle, Manager, WebviewWindow};

use crate::{
    append_desktop_log,
    control_client::ControlClient,
    shortcut_config::WindowShortcutAction,
    shortcut_dispatcher::ShortcutTarget,
    ui_dispatch,
    window_lifecycle::WindowSurface,
    ControlCommand, MAIN_WINDOW_LABEL,
};

fn main_window(app_handle: &AppHandle) -> Result<WebviewWindow, String> {
    app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "main window not found".to_string())
}

fn eval_in_main_window(app_handle: &AppHandle, script: &str) -> Result<(), String> {
    main_window(app_handle)?
        .eval(script)
        .map_err(|error| format!("failed to evaluate script in main window: {error}"))
}

fn js_string(value: &str) -> Result<String, String> {
    serde_json::to_string(value).map_err(|error| format!("failed to encode script argument: {error}"))
}

pub(crate) fn navigation_script(backend_url: &str) -> Result<String, String> {
    Ok(format!("window.location.replace({})", js_string(backend_url)?))
}

pub(crate) fn status_script(text: &str) -> Result<String, String> {
    Ok(format!(
        "window.nkasSetStatus && window.nkasSetStatus({})",
        js_string(text)?
    ))
}

pub(crate) fn navigate_main_window_to_backend(
    app_handle: &AppHandle,
    backend_url: &str,
) -> Result<(), String> {
    eval_in_main_window(app_handle, &navigation_script(backend_url)?)
}

/// Updates the status line of the bundled loading page.
pub(crate) fn set_loading_status(app_handle: &AppHandle, text: &str) -> Result<(), String> {
    eval_in_main_window(app_handle, &status_script(text)?)
}

pub(crate) fn reload_main_window(app_handle: &AppHandle) {
    if let Err(error) = eval_in_main_window(app_handle, "window.location.reload()") {
        append_desktop_log(&format!("failed to reload main window: {error}"));
    }
}

pub(crate) fn toggle_main_window_devtools(app_handle: &AppHandle) {
    let window = match main_window(app_handle) {
        Ok(window) => window,
        Err(error) => {
            append_desktop_log(&format!("devtools toggle skipped: {error}"));
            return;
        }
    };
    if window.is_devtools_open() {
        window.close_devtools();
    } else {
        window.open_devtools();
    }
}

pub(crate) fn is_main_window_focused(app_handle: &AppHandle) -> bool {
    main_window(app_handle)
        .and_then(|window| window.is_focused().map_err(|error| error.to_string()))
        .unwrap_or(false)
}

/// `WindowSurface` over the Tauri main window.
#[derive(Clone)]
pub(crate) struct MainWindowSurface {
    app_handle: AppHandle,
}

impl MainWindowSurface {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }

    fn with_window<T, F>(&self, operation: &str, f: F) -> Result<T, String>
    where
        F: FnOnce(&WebviewWindow) -> tauri::Result<T>,
    {
        let window = main_window(&self.app_handle)?;
        f(&window).map_err(|error| format!("{operation}: {error}"))
    }
}

impl WindowSurface for MainWindowSurface {
    fn is_visible(&self) -> Result<bool, String> {
        self.with_window("is_visible", |window| window.is_visible())
    }

    fn is_minimized(&self) -> Result<bool, String> {
        self.with_window("is_minimized", |window| window.is_minimized())
    }

    fn is_maximized(&self) -> Result<bool, String> {
        self.with_window("is_maximized", |window| window.is_maximized())
    }

    fn show(&self) -> Result<(), String> {
        self.with_window("show", |window| window.show())
    }

    fn hide(&self) -> Result<(), String> {
        self.with_window("hide", |window| window.hide())
    }

    fn minimize(&self) -> Result<(), String> {
        self.with_window("minimize", |window| window.minimize())
    }

    fn unminimize(&self) -> Result<(), String> {
        self.with_window("unminimize", |window| window.unminimize())
    }

    fn maximize(&self) -> Result<(), String> {
        self.with_window("maximize", |window| window.maximize())
    }

    fn unmaximize(&self) -> Result<(), String> {
        self.with_window("unmaximize", |window| window.unmaximize())
    }

    fn focus(&self) -> Result<(), String> {
        self.with_window("set_focus", |window| window.set_focus())
    }

    /// The termination callback runs on a runtime worker, so the close is
    /// handed to the main thread.
    fn close(&self) -> Result<(), String> {
        ui_dispatch::run_on_main_thread_dispatch(&self.app_handle, "close main window", |app| {
            let closed = main_window(app)
                .and_then(|window| window.close().map_err(|error| error.to_string()));
            if let Err(error) = closed {
                append_desktop_log(&format!("failed to close main window: {error}"));
                app.exit(0);
            }
        })
    }
}

/// Routes pressed hotkeys to the control API or the main window.
pub(crate) struct AppShortcutTarget {
    app_handle: AppHandle,
    control: ControlClient,
}

impl AppShortcutTarget {
    pub(crate) fn new(app_handle: AppHandle, control: ControlClient) -> Self {
        Self {
            app_handle,
            control,
        }
    }
}

impl ShortcutTarget for AppShortcutTarget {
    fn send_control_command(&self, command: ControlCommand) {
        crate::append_shortcut_log(&format!("sending control command {}", command.name()));
        self.control.dispatch(command);
    }

    fn is_main_window_focused(&self) -> bool {
        is_main_window_focused(&self.app_handle)
    }

    fn run_window_action(&self, action: WindowShortcutAction) {
        let result = ui_dispatch::run_on_main_thread_dispatch(
            &self.app_handle,
            "shortcut window action",
            move |app| match action {
                WindowShortcutAction::ToggleDevTools => toggle_main_window_devtools(app),
                WindowShortcutAction::Reload | WindowShortcutAction::HardReload => {
                    reload_main_window(app)
                }
            },
        );
        if let Err(error) = result {
            append_desktop_log(&error);
        }
    }
}
