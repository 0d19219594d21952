use tauri::{AppHandle, Manager};

use crate::{main_window, ShellState};

/// Activation path for reopen and second-instance launches. A destroyed main
/// window is rebuilt and reveals itself once its content is ready.
pub fn show_or_recreate_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    if app_handle
        .state::<ShellState>()
        .current_main_window()
        .is_some()
    {
        main_window::show_main_window(app_handle, log);
        return;
    }

    log("main window missing, recreating");
    if let Err(error) = main_window::create_main_window(app_handle) {
        log(&format!("failed to recreate main window: {error}"));
    }
}
