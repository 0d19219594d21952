use tauri::{
    image::Image,
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::{
    append_desktop_log, icon_assets, platform::Platform, runtime_paths, tray_actions,
    tray_menu_handler, window_actions, ShellState, APP_NAME, TRAY_ID,
};

/// Tray art for this platform, or `None` to fall back to the app's default icon.
fn load_tray_icon(app_handle: &AppHandle, platform: Platform) -> Option<Image<'static>> {
    let path = icon_assets::resolve_tray_icon_path(platform, |relative| {
        runtime_paths::resolve_resource_path(app_handle, relative)
    })?;
    let resize_to = platform
        .downsizes_tray_icon()
        .then_some(icon_assets::TRAY_ICON_SIZE);

    match icon_assets::load_icon_image(&path, resize_to) {
        Ok(icon) => Some(icon),
        Err(error) => {
            append_desktop_log(&format!("tray icon unusable, using default: {error}"));
            None
        }
    }
}

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    if !app_handle.state::<ShellState>().claim_tray_creation() {
        append_desktop_log("tray already created, skipping");
        return Ok(());
    }

    let open_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_OPEN,
        format!("Open {APP_NAME}"),
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray open menu item: {error}"))?;
    let check_updates_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_CHECK_FOR_UPDATES,
        "Check for Updates",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray update menu item: {error}"))?;
    let quit_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_QUIT,
        "Quit",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray quit menu item: {error}"))?;
    let separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(
        app_handle,
        &[&open_item, &check_updates_item, &separator, &quit_item],
    )
    .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    let icon = load_tray_icon(app_handle, Platform::current())
        .or_else(|| app_handle.default_window_icon().map(|icon| icon.clone().to_owned()));

    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip(APP_NAME)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(|tray, event| {
            // Only emitted on Windows; elsewhere the "Open" menu item covers it.
            if let TrayIconEvent::DoubleClick {
                button: MouseButton::Left,
                ..
            } = event
            {
                window_actions::show_or_recreate_main_window(
                    tray.app_handle(),
                    append_desktop_log,
                );
            }
        });
    if let Some(icon) = icon {
        tray_builder = tray_builder.icon(icon);
    }

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;
    Ok(())
}
