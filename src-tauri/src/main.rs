#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod backend_launch;
mod backend_readiness;
mod backend_supervisor;
mod config_resolver;
mod control_client;
mod deploy_config;
mod desktop_bridge_commands;
mod exit_events;
mod global_shortcut_registry;
mod logging;
mod process_control;
mod runtime_paths;
mod shell_error;
mod shell_locale;
mod shell_session;
mod shortcut_config;
mod shortcut_dispatcher;
mod single_instance;
mod startup_task;
mod tray_actions;
mod tray_menu_handler;
mod tray_setup;
mod ui_dispatch;
mod webview_flags;
mod window_actions;
mod window_lifecycle;
mod window_persistence;

pub(crate) use app_constants::*;
pub(crate) use app_types::{BackendBridgeResult, BackendBridgeState, ControlBridgeResult};
pub(crate) use backend_launch::build_debug_command;
pub(crate) use control_client::ControlCommand;
pub(crate) use logging::{
    append_desktop_log, append_shortcut_log, append_shutdown_log, append_startup_log,
};
pub(crate) use shell_error::{ShellError, ShellResult};

fn main() {
    app_runtime::run();
}
