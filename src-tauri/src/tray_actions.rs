pub const TRAY_MENU_OPEN: &str = "tray_open";
pub const TRAY_MENU_CHECK_FOR_UPDATES: &str = "tray_check_updates";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    Open,
    CheckForUpdates,
    Quit,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    match menu_id {
        TRAY_MENU_OPEN => Some(TrayMenuAction::Open),
        TRAY_MENU_CHECK_FOR_UPDATES => Some(TrayMenuAction::CheckForUpdates),
        TRAY_MENU_QUIT => Some(TrayMenuAction::Quit),
        _ => None,
    }
}
