use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, shell_session::ShellSession, BackendBridgeResult, BackendBridgeState,
    ControlBridgeResult, ControlCommand,
};

/// Window requests the web UI can make through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiRequest {
    MinimizeToTray,
    Minimize,
    ToggleMaximize,
    Close,
}

impl UiRequest {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "minimize-to-tray" | "window-tray" => Some(Self::MinimizeToTray),
            "window-min" => Some(Self::Minimize),
            "window-max" => Some(Self::ToggleMaximize),
            "window-close" => Some(Self::Close),
            _ => None,
        }
    }
}

fn bridge_ok() -> BackendBridgeResult {
    BackendBridgeResult {
        ok: true,
        reason: None,
    }
}

fn bridge_error(reason: impl Into<String>) -> BackendBridgeResult {
    BackendBridgeResult {
        ok: false,
        reason: Some(reason.into()),
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_backend_state(app_handle: AppHandle) -> BackendBridgeState {
    let Some(session) = app_handle.try_state::<ShellSession>() else {
        return BackendBridgeState::from_snapshot(None, true);
    };
    BackendBridgeState::from_snapshot(session.supervisor.snapshot().as_ref(), session.is_quitting())
}

#[tauri::command]
pub(crate) fn desktop_bridge_ui_request(app_handle: AppHandle, request: String) -> BackendBridgeResult {
    let Some(ui_request) = UiRequest::parse(&request) else {
        append_desktop_log(&format!("unknown ui request '{request}' ignored"));
        return bridge_error(format!("Unknown UI request '{request}'."));
    };
    let Some(session) = app_handle.try_state::<ShellSession>() else {
        return bridge_error("Desktop shell is not ready.");
    };

    match ui_request {
        UiRequest::MinimizeToTray => session.windows.hide(),
        UiRequest::Minimize => session.windows.minimize(),
        UiRequest::ToggleMaximize => session.windows.toggle_maximize(),
        UiRequest::Close => session.request_close(),
    }
    bridge_ok()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_send_control_command(
    app_handle: AppHandle,
    command: String,
) -> ControlBridgeResult {
    let Some(control_command) = ControlCommand::from_name(&command) else {
        return ControlBridgeResult::failed(format!("Unknown control command '{command}'."));
    };
    let Some(client) = app_handle
        .try_state::<ShellSession>()
        .map(|session| session.control.clone())
    else {
        return ControlBridgeResult::failed("Desktop shell is not ready.");
    };

    let result = client.send(control_command).await;
    crate::control_client::log_outcome(control_command, &result);
    match result {
        Ok(outcome) => outcome.into(),
        Err(error) => ControlBridgeResult::failed(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_requests_parse_from_bridge_names() {
        assert_eq!(UiRequest::parse("minimize-to-tray"), Some(UiRequest::MinimizeToTray));
        assert_eq!(UiRequest::parse("window-tray"), Some(UiRequest::MinimizeToTray));
        assert_eq!(UiRequest::parse("window-min"), Some(UiRequest::Minimize));
        assert_eq!(UiRequest::parse("window-max"), Some(UiRequest::ToggleMaximize));
        assert_eq!(UiRequest::parse(" window-close "), Some(UiRequest::Close));
        assert_eq!(UiRequest::parse("window-fullscreen"), None);
    }

    #[test]
    fn bridge_results_serialize_reason() {
        let json = serde_json::to_value(bridge_error("nope")).expect("serialize");
        assert_eq!(json["ok"], false);
        assert_eq!(json["reason"], "nope");
        assert_eq!(serde_json::to_value(bridge_ok()).unwrap()["reason"], serde_json::Value::Null);
    }
}
