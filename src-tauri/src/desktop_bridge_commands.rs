use tauri::WebviewWindow;

use crate::{
    append_desktop_log, context_menu, context_menu::ContextMenuRequest, external_links,
    BridgeResult,
};

#[tauri::command]
pub(crate) fn desktop_bridge_show_context_menu(
    window: WebviewWindow,
    request: ContextMenuRequest,
) -> BridgeResult {
    let result = context_menu::popup_context_menu(&window, &request);
    if let Err(error) = &result {
        append_desktop_log(error);
    }
    BridgeResult::from_result(result)
}

#[tauri::command]
pub(crate) fn desktop_bridge_open_external_url(url: String) -> BridgeResult {
    let result = external_links::open_external(&url);
    match &result {
        Ok(()) => append_desktop_log(&format!("opened external url from page: {url}")),
        Err(error) => append_desktop_log(&format!("failed to open external url {url}: {error}")),
    }
    BridgeResult::from_result(result)
}
