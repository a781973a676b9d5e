use std::time::Duration;

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const TRAY_ID: &str = "nkas-tray";
pub(crate) const TRAY_TOOLTIP: &str = "NKAS";

pub(crate) const ROOT_DIR_ENV: &str = "NKAS_ROOT";
pub(crate) const UI_REVEAL_ENV: &str = "NKAS_UI_REVEAL";
pub(crate) const SHELL_LOCALE_ENV: &str = "NKAS_DESKTOP_LOCALE";
pub(crate) const DEFAULT_SHELL_LOCALE: &str = "en-US";

pub(crate) const CONFIG_DIR: &str = "config";
pub(crate) const DEPLOY_CONFIG_FILE: &str = "deploy.yaml";
pub(crate) const SHORTCUTS_CONFIG_FILE: &str = "shortcuts.yaml";
pub(crate) const LOG_DIR: &str = "log";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";

pub(crate) const DEFAULT_PYTHON_EXECUTABLE: &str = "./toolkit/python.exe";
pub(crate) const DEFAULT_WEBUI_PORT: &str = "22267";
pub(crate) const BACKEND_ENTRY_SCRIPT: &str = "gui.py";
pub(crate) const BACKEND_MANAGED_MODE_FLAG: &str = "--electron";
pub(crate) const CONTROL_API_HOST: &str = "127.0.0.1";

pub(crate) const READINESS_MARKERS: [&str; 2] = ["Application startup complete", "bind on address"];

pub(crate) const CONTROL_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub(crate) const BACKEND_OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) const BACKEND_LOG_TARGET: &str = "nkas_backend";

#[cfg(target_os = "windows")]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x0800_0000;
