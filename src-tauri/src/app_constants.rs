pub const APP_NAME: &str = "BrandBay";
pub const DEFAULT_APP_URL: &str = "https://app.brandbay.io/";
pub const DEFAULT_SPLASH_DELAY_MS: u64 = 1500;

/// Budget for the HTTP reachability check against the app URL.
pub const REACHABILITY_TIMEOUT_SECS: u64 = 10;
/// How long an accepted remote navigation may take to finish before the offline page replaces it.
pub const REMOTE_LOAD_TIMEOUT_SECS: u64 = 20;
/// The main window is revealed after this long even if no page ever finished loading.
pub const REVEAL_WATCHDOG_SECS: u64 = 25;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const SPLASH_WINDOW_LABEL: &str = "splash";
pub const TRAY_ID: &str = "brandbay-tray";

pub const SPLASH_PAGE: &str = "splash.html";
pub const FALLBACK_PAGE: &str = "offline.html";

pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DESKTOP_STATE_FILE: &str = "desktop_state.json";
