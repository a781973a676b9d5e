use tauri::{plugin::TauriPlugin, AppHandle, Manager, Wry};

use crate::{append_desktop_log, shell_session::ShellSession, ShellError};

/// Must be the first plugin registered: a denied launch exits inside the
/// plugin, before setup creates windows or spawns the backend.
pub(crate) fn plugin() -> TauriPlugin<Wry> {
    tauri_plugin_single_instance::init(|app_handle, argv, cwd| {
        handle_second_instance(app_handle, &argv, &cwd);
    })
}

fn handle_second_instance(app_handle: &AppHandle, argv: &[String], cwd: &str) {
    tracing::warn!(?argv, cwd, "{}", ShellError::SecondInstanceDenied);

    let Some(session) = app_handle.try_state::<ShellSession>() else {
        append_desktop_log("second instance arrived before the shell session was ready");
        return;
    };
    if session.is_quitting() {
        return;
    }
    tracing::debug!(state = ?session.windows.state(), "activating existing main window");
    session.windows.show();
}
