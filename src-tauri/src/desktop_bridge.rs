use tauri::Webview;
use url::Url;

use crate::{append_desktop_log, main_window, FALLBACK_PAGE};

const DESKTOP_BRIDGE_SCRIPT: &str = r#"
(() => {
  if (window.__BRANDBAY_DESKTOP_BRIDGE__) {
    return;
  }
  window.__BRANDBAY_DESKTOP_BRIDGE__ = true;

  const invoke = (command, args) => {
    const internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== 'function') {
      return Promise.resolve({ ok: false, reason: 'bridge unavailable' });
    }
    return internals.invoke(command, args);
  };

  const isEditable = (element) => {
    if (!element || !(element instanceof Element)) {
      return false;
    }
    if (element.isContentEditable) {
      return true;
    }
    const tag = element.tagName;
    if (tag === 'TEXTAREA') {
      return !element.readOnly && !element.disabled;
    }
    if (tag === 'INPUT') {
      const nonText = ['button', 'checkbox', 'color', 'file', 'hidden', 'image', 'radio', 'range', 'reset', 'submit'];
      return !nonText.includes((element.type || '').toLowerCase()) && !element.readOnly && !element.disabled;
    }
    return false;
  };

  const historyState = () => {
    const nav = window.navigation;
    if (nav && typeof nav.canGoBack === 'boolean') {
      return { canGoBack: nav.canGoBack, canGoForward: nav.canGoForward };
    }
    return { canGoBack: window.history.length > 1, canGoForward: false };
  };

  window.addEventListener('contextmenu', (event) => {
    event.preventDefault();
    const selection = window.getSelection ? String(window.getSelection() || '') : '';
    const request = {
      isEditable: isEditable(event.target),
      selectionText: selection,
      ...historyState(),
    };
    invoke('desktop_bridge_show_context_menu', { request }).catch(() => {});
  }, true);

  window.brandbayDesktop = Object.freeze({
    isDesktopRuntime: true,
    openExternalUrl: (url) => invoke('desktop_bridge_open_external_url', { url }),
  });
})();
"#;

/// The bridge goes into pages on the app's exact origin and the bundled
/// offline page, nothing else. Sign-in hosts a redirect lands on get none.
pub fn should_inject_desktop_bridge(app_url: &Url, page_url: &Url) -> bool {
    let same_origin = page_url.host_str().is_some()
        && page_url.scheme() == app_url.scheme()
        && page_url.host_str() == app_url.host_str()
        && page_url.port_or_known_default() == app_url.port_or_known_default();
    same_origin || main_window::is_bundled_page(page_url, FALLBACK_PAGE)
}

pub fn inject_desktop_bridge(webview: &Webview) {
    if let Err(error) = webview.eval(DESKTOP_BRIDGE_SCRIPT) {
        append_desktop_log(&format!("failed to inject desktop bridge script: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[test]
    fn should_inject_on_app_host_pages() {
        let app = url("https://app.brandbay.io/");
        assert!(should_inject_desktop_bridge(&app, &url("https://app.brandbay.io/projects/42")));
        assert!(should_inject_desktop_bridge(&app, &url("tauri://localhost/offline.html")));
    }

    #[test]
    fn should_not_inject_on_foreign_or_placeholder_pages() {
        let app = url("https://app.brandbay.io/");
        assert!(!should_inject_desktop_bridge(&app, &url("https://evil.example.com/")));
        assert!(!should_inject_desktop_bridge(&app, &url("https://evil.example.com/offline.html")));
        assert!(!should_inject_desktop_bridge(&app, &url("https://login.brandbay.io/authorize")));
        assert!(!should_inject_desktop_bridge(&app, &url("http://app.brandbay.io/")));
        assert!(!should_inject_desktop_bridge(&app, &url("https://app.brandbay.io:8443/")));
        assert!(!should_inject_desktop_bridge(&app, &url("about:blank")));
        assert!(!should_inject_desktop_bridge(&app, &url("tauri://localhost/splash.html")));
    }

    #[test]
    fn bridge_script_installs_single_guarded_listener() {
        assert_eq!(DESKTOP_BRIDGE_SCRIPT.matches("addEventListener('contextmenu'").count(), 1);
        assert!(DESKTOP_BRIDGE_SCRIPT.contains("if (window.__BRANDBAY_DESKTOP_BRIDGE__)"));
        assert!(DESKTOP_BRIDGE_SCRIPT.contains("'desktop_bridge_show_context_menu'"));
    }
}
