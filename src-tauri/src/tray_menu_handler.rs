use tauri::{AppHandle, Manager};

use crate::{append_shutdown_log, shell_session::ShellSession, tray_actions};

pub(crate) fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    let Some(action) = tray_actions::action_from_menu_id(menu_id) else {
        return;
    };
    let Some(session) = app_handle.try_state::<ShellSession>() else {
        return;
    };

    match action {
        tray_actions::TrayMenuAction::ShowWindow => session.windows.show(),
        tray_actions::TrayMenuAction::HideWindow => session.windows.hide(),
        tray_actions::TrayMenuAction::Quit => {
            append_shutdown_log("tray exit requested");
            session.request_close();
        }
    }
}

pub(crate) fn handle_tray_left_click(app_handle: &AppHandle) {
    if let Some(session) = app_handle.try_state::<ShellSession>() {
        session.windows.toggle_visibility();
    }
}
