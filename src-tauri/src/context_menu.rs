use serde::Deserialize;
use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    AppHandle, Manager, WebviewWindow,
};

use crate::{append_desktop_log, MAIN_WINDOW_LABEL};

pub const CONTEXT_MENU_BACK: &str = "ctx_back";
pub const CONTEXT_MENU_FORWARD: &str = "ctx_forward";
pub const CONTEXT_MENU_RELOAD: &str = "ctx_reload";

/// What the page reported about the right-clicked element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuRequest {
    #[serde(default)]
    pub is_editable: bool,
    #[serde(default)]
    pub selection_text: String,
    #[serde(default)]
    pub can_go_back: bool,
    #[serde(default)]
    pub can_go_forward: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuEntry {
    Cut,
    Copy,
    Paste,
    Separator,
    Back { enabled: bool },
    Forward { enabled: bool },
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuAction {
    Back,
    Forward,
    Reload,
}

impl ContextMenuAction {
    fn script(self) -> &'static str {
        match self {
            Self::Back => "window.history.back();",
            Self::Forward => "window.history.forward();",
            Self::Reload => "window.location.reload();",
        }
    }
}

pub fn context_menu_entries(request: &ContextMenuRequest) -> Vec<ContextMenuEntry> {
    let mut entries = Vec::with_capacity(7);
    if request.is_editable {
        entries.extend([
            ContextMenuEntry::Cut,
            ContextMenuEntry::Copy,
            ContextMenuEntry::Paste,
            ContextMenuEntry::Separator,
        ]);
    } else if !request.selection_text.is_empty() {
        entries.extend([ContextMenuEntry::Copy, ContextMenuEntry::Separator]);
    }

    entries.extend([
        ContextMenuEntry::Back {
            enabled: request.can_go_back,
        },
        ContextMenuEntry::Forward {
            enabled: request.can_go_forward,
        },
        ContextMenuEntry::Reload,
    ]);
    entries
}

pub fn action_from_menu_id(menu_id: &str) -> Option<ContextMenuAction> {
    match menu_id {
        CONTEXT_MENU_BACK => Some(ContextMenuAction::Back),
        CONTEXT_MENU_FORWARD => Some(ContextMenuAction::Forward),
        CONTEXT_MENU_RELOAD => Some(ContextMenuAction::Reload),
        _ => None,
    }
}

fn build_context_menu(
    app_handle: &AppHandle,
    entries: &[ContextMenuEntry],
) -> Result<Menu<tauri::Wry>, String> {
    let menu =
        Menu::new(app_handle).map_err(|error| format!("Failed to create context menu: {error}"))?;

    for entry in entries {
        let appended = match *entry {
            ContextMenuEntry::Cut => PredefinedMenuItem::cut(app_handle, None)
                .and_then(|item| menu.append(&item)),
            ContextMenuEntry::Copy => PredefinedMenuItem::copy(app_handle, None)
                .and_then(|item| menu.append(&item)),
            ContextMenuEntry::Paste => PredefinedMenuItem::paste(app_handle, None)
                .and_then(|item| menu.append(&item)),
            ContextMenuEntry::Separator => PredefinedMenuItem::separator(app_handle)
                .and_then(|item| menu.append(&item)),
            ContextMenuEntry::Back { enabled } => {
                MenuItem::with_id(app_handle, CONTEXT_MENU_BACK, "Back", enabled, None::<&str>)
                    .and_then(|item| menu.append(&item))
            }
            ContextMenuEntry::Forward { enabled } => MenuItem::with_id(
                app_handle,
                CONTEXT_MENU_FORWARD,
                "Forward",
                enabled,
                None::<&str>,
            )
            .and_then(|item| menu.append(&item)),
            ContextMenuEntry::Reload => {
                MenuItem::with_id(app_handle, CONTEXT_MENU_RELOAD, "Reload", true, None::<&str>)
                    .and_then(|item| menu.append(&item))
            }
        };
        appended.map_err(|error| format!("Failed to add {entry:?} to context menu: {error}"))?;
    }

    Ok(menu)
}

/// Builds a fresh menu for this request and pops it up at the cursor.
pub fn popup_context_menu(
    window: &WebviewWindow,
    request: &ContextMenuRequest,
) -> Result<(), String> {
    let entries = context_menu_entries(request);
    let menu = build_context_menu(window.app_handle(), &entries)?;
    window
        .popup_menu(&menu)
        .map_err(|error| format!("Failed to show context menu: {error}"))
}

pub fn handle_context_menu_event(app_handle: &AppHandle, menu_id: &str) {
    let Some(action) = action_from_menu_id(menu_id) else {
        return;
    };
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        append_desktop_log(&format!("context menu {action:?} ignored: main window not found"));
        return;
    };
    if let Err(error) = window.eval(action.script()) {
        append_desktop_log(&format!("context menu {action:?} failed: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editable_target_gets_clipboard_entries_first() {
        let request = ContextMenuRequest {
            is_editable: true,
            selection_text: "ignored".to_string(),
            can_go_back: true,
            can_go_forward: false,
        };
        assert_eq!(
            context_menu_entries(&request),
            vec![
                ContextMenuEntry::Cut,
                ContextMenuEntry::Copy,
                ContextMenuEntry::Paste,
                ContextMenuEntry::Separator,
                ContextMenuEntry::Back { enabled: true },
                ContextMenuEntry::Forward { enabled: false },
                ContextMenuEntry::Reload,
            ]
        );
    }

    #[test]
    fn selected_text_gets_copy_only() {
        let request = ContextMenuRequest {
            selection_text: "hello".to_string(),
            can_go_forward: true,
            ..ContextMenuRequest::default()
        };
        assert_eq!(
            context_menu_entries(&request),
            vec![
                ContextMenuEntry::Copy,
                ContextMenuEntry::Separator,
                ContextMenuEntry::Back { enabled: false },
                ContextMenuEntry::Forward { enabled: true },
                ContextMenuEntry::Reload,
            ]
        );
    }

    #[test]
    fn plain_target_gets_navigation_only() {
        assert_eq!(
            context_menu_entries(&ContextMenuRequest::default()),
            vec![
                ContextMenuEntry::Back { enabled: false },
                ContextMenuEntry::Forward { enabled: false },
                ContextMenuEntry::Reload,
            ]
        );
    }

    #[test]
    fn request_deserializes_from_page_payload() {
        let request: ContextMenuRequest = serde_json::from_str(
            r#"{"isEditable":false,"selectionText":"abc","canGoBack":true}"#,
        )
        .expect("parse request");
        assert_eq!(request.selection_text, "abc");
        assert!(request.can_go_back);
        assert!(!request.can_go_forward);
    }

    #[test]
    fn action_from_menu_id_maps_navigation_ids() {
        assert_eq!(action_from_menu_id(CONTEXT_MENU_BACK), Some(ContextMenuAction::Back));
        assert_eq!(
            action_from_menu_id(CONTEXT_MENU_FORWARD),
            Some(ContextMenuAction::Forward)
        );
        assert_eq!(
            action_from_menu_id(CONTEXT_MENU_RELOAD),
            Some(ContextMenuAction::Reload)
        );
        assert_eq!(action_from_menu_id("tray_quit"), None);
    }
}
