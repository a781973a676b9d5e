use tauri::AppHandle;

/// Runs `action` on the main thread; window APIs must not be driven from
/// runtime workers.
pub(crate) fn run_on_main_thread_dispatch<F>(
    app_handle: &AppHandle,
    task_name: &str,
    action: F,
) -> Result<(), String>
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    let main_app = app_handle.clone();
    app_handle
        .run_on_main_thread(move || action(&main_app))
        .map_err(|error| format!("failed to dispatch {task_name} to main thread: {error}"))
}
