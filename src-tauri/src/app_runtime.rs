use tauri::{Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, config_resolver, exit_events, logging,
    runtime_paths, shell_session::ShellSession, single_instance, startup_task, tray_setup,
    webview_flags, window_persistence, MAIN_WINDOW_LABEL,
};

pub(crate) fn run() {
    let root_dir = runtime_paths::default_root_dir();
    logging::init(&root_dir);

    append_startup_log("desktop process starting");
    let settings = config_resolver::resolve_shell_settings(root_dir);
    webview_flags::apply_dpi_scaling(settings.deploy.dpi_scaling);

    tauri::Builder::default()
        .plugin(single_instance::plugin())
        .plugin(window_persistence::plugin())
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_get_backend_state,
            crate::desktop_bridge_commands::desktop_bridge_ui_request,
            crate::desktop_bridge_commands::desktop_bridge_send_control_command,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { api, .. } = event {
                let Some(session) = window.app_handle().try_state::<ShellSession>() else {
                    return;
                };
                if session.is_quitting() {
                    return;
                }

                api.prevent_close();
                append_desktop_log("main window close requested");
                session.request_close();
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            let session = ShellSession::new(&app_handle, settings)?;
            if !app.manage(session) {
                append_desktop_log("shell session already managed, skipping");
            }

            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }
            app.state::<ShellSession>().register_shortcuts();
            startup_task::spawn_startup_task(&app_handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { api, .. } => {
                exit_events::handle_exit_requested(app_handle, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            _ => {}
        });
}
