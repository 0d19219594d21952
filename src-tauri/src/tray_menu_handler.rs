use tauri::AppHandle;

use crate::{
    append_desktop_log, tray_actions, update_flow, update_lifecycle::CheckOrigin, window_actions,
};

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match tray_actions::action_from_menu_id(menu_id) {
        Some(tray_actions::TrayMenuAction::Open) => {
            window_actions::show_or_recreate_main_window(app_handle, append_desktop_log)
        }
        Some(tray_actions::TrayMenuAction::CheckForUpdates) => {
            append_desktop_log("tray requested update check");
            update_flow::spawn_update_check(app_handle, CheckOrigin::Manual);
        }
        Some(tray_actions::TrayMenuAction::Quit) => {
            append_desktop_log("tray quit requested, exiting desktop process");
            app_handle.exit(0);
        }
        None => {}
    }
}
