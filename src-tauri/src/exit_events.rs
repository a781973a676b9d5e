use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{append_shutdown_log, shell_session::ShellSession};

/// An exit while the backend may still be alive becomes a close request;
/// the exit is let through once the close flow is underway.
pub(crate) fn handle_exit_requested(app_handle: &AppHandle, api: &ExitRequestApi) {
    let Some(session) = app_handle.try_state::<ShellSession>() else {
        return;
    };
    if session.is_quitting() {
        append_shutdown_log("exit request accepted");
        return;
    }

    api.prevent_exit();
    append_shutdown_log("exit requested; stopping backend first");
    session.request_close();
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    if let Some(session) = app_handle.try_state::<ShellSession>() {
        session.release_resources();
    }
    append_shutdown_log("desktop process exiting");
}
