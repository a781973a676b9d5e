use tauri::{AppHandle, Manager};

use crate::{
    append_startup_log,
    backend_supervisor::{ExitReport, ProcessState},
    config_resolver::UiRevealPolicy,
    shell_session::ShellSession,
    ui_dispatch, window_actions,
};

/// Wires the reveal policy to the supervisor callbacks, then spawns the
/// backend.
pub(crate) fn spawn_startup_task(app_handle: &AppHandle) {
    let session = app_handle.state::<ShellSession>();
    let reveal_policy = session.settings.reveal_policy;
    if reveal_policy == UiRevealPolicy::Immediate {
        session.windows.show();
    }

    let ready_app = app_handle.clone();
    session.supervisor.on_ready(move || {
        append_startup_log("backend ready; loading web UI");
        dispatch_or_log(&ready_app, "reveal main window", move |app| {
            let session = app.state::<ShellSession>();
            if let Err(error) = window_actions::navigate_main_window_to_backend(
                app,
                &session.settings.control_base_url,
            ) {
                append_startup_log(&format!("failed to load web UI: {error}"));
            }
            if reveal_policy == UiRevealPolicy::WaitForReadiness {
                session.windows.show();
            }
        });
    });

    let end_app = app_handle.clone();
    session.supervisor.on_end(move |report| {
        append_startup_log(&format!(
            "backend ended as {} (exit code {:?})",
            report.final_state.as_str(),
            report.exit_code
        ));
        let Some(status) = failure_status_text(&report) else {
            return;
        };
        dispatch_or_log(&end_app, "surface backend failure", move |app| {
            let session = app.state::<ShellSession>();
            if session.is_quitting() {
                return;
            }
            session.windows.show();
            if let Err(error) = window_actions::set_loading_status(app, &status) {
                append_startup_log(&format!("failed to show backend status: {error}"));
            }
        });
    });

    let plan = session.launch_plan();
    append_startup_log(&format!(
        "starting backend: {:?} in {}",
        crate::build_debug_command(&plan),
        plan.cwd.display()
    ));
    if let Err(error) = session.supervisor.start(plan) {
        tracing::error!("{error}");
    }
}

/// Text for the loading page when the backend is gone for reasons other
/// than a requested stop.
fn failure_status_text(report: &ExitReport) -> Option<String> {
    if let Some(error) = report.error.as_deref() {
        return Some(format!("NKAS backend could not be started: {error}"));
    }
    if report.final_state != ProcessState::Failed {
        return None;
    }
    Some(match report.exit_code {
        Some(code) => format!("NKAS backend exited unexpectedly (exit code {code})."),
        None => "NKAS backend was terminated unexpectedly.".to_string(),
    })
}

fn dispatch_or_log<F>(app_handle: &AppHandle, task_name: &str, action: F)
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    if let Err(error) = ui_dispatch::run_on_main_thread_dispatch(app_handle, task_name, action) {
        append_startup_log(&error);
    }
}
