#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod connectivity;
mod context_menu;
mod desktop_bridge;
mod desktop_bridge_commands;
mod external_links;
mod icon_assets;
mod logging;
mod main_window;
mod platform;
mod runtime_paths;
mod shell_config;
mod splash_window;
mod tray_actions;
mod tray_menu_handler;
mod tray_setup;
mod update_flow;
mod update_lifecycle;
mod window_actions;

pub(crate) use app_constants::*;
pub(crate) use app_types::{BridgeResult, PendingInstall, ShellState, UpdateState};
pub(crate) use logging::{append_desktop_log, append_startup_log, append_update_log};

fn main() {
    app_runtime::run();
}
