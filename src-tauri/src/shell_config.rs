use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::{append_startup_log, DEFAULT_APP_URL, DEFAULT_SPLASH_DELAY_MS, DESKTOP_STATE_FILE};

const APP_URL_ENV: &str = "BRANDBAY_APP_URL";
const SPLASH_DELAY_ENV: &str = "BRANDBAY_SPLASH_DELAY_MS";
const AUTO_INSTALL_ENV: &str = "BRANDBAY_AUTO_INSTALL_UPDATES";
const VERBOSE_STARTUP_ENV: &str = "BRANDBAY_VERBOSE_STARTUP_LOG";
const STARTUP_UPDATE_CHECK_ENV: &str = "BRANDBAY_STARTUP_UPDATE_CHECK";

/// Optional overrides persisted next to the desktop logs.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DesktopStateFile {
    app_url: Option<String>,
    splash_delay_ms: Option<u64>,
    auto_install_on_download: Option<bool>,
    verbose_startup_logging: Option<bool>,
    check_updates_on_startup: Option<bool>,
}

#[derive(Debug, Clone)]
pub(crate) struct ShellConfig {
    pub(crate) app_url: Url,
    pub(crate) splash_delay: Duration,
    /// Install a downloaded update right away instead of asking first.
    pub(crate) auto_install_on_download: bool,
    pub(crate) verbose_startup_logging: bool,
    pub(crate) check_updates_on_startup: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_url: default_app_url(),
            splash_delay: Duration::from_millis(DEFAULT_SPLASH_DELAY_MS),
            auto_install_on_download: false,
            verbose_startup_logging: true,
            check_updates_on_startup: true,
        }
    }
}

impl ShellConfig {
    pub(crate) fn load(root_dir: Option<&Path>) -> Self {
        let state_path = desktop_state_path(root_dir);
        Self::from_sources(state_path.as_deref(), |key| env::var(key).ok())
    }

    pub(crate) fn from_sources<E>(state_path: Option<&Path>, env_lookup: E) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let state = state_path.and_then(read_state_file).unwrap_or_default();
        let defaults = Self::default();

        let raw_app_url = env_lookup(APP_URL_ENV).or(state.app_url);
        let app_url = raw_app_url
            .as_deref()
            .map(normalize_app_url)
            .unwrap_or(defaults.app_url);

        let splash_delay_ms = env_lookup(SPLASH_DELAY_ENV)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .or(state.splash_delay_ms)
            .unwrap_or(DEFAULT_SPLASH_DELAY_MS);

        let bool_option = |key: &str, from_state: Option<bool>, default: bool| {
            env_lookup(key)
                .and_then(|value| parse_bool_flag(&value))
                .or(from_state)
                .unwrap_or(default)
        };

        Self {
            app_url,
            splash_delay: Duration::from_millis(splash_delay_ms),
            auto_install_on_download: bool_option(
                AUTO_INSTALL_ENV,
                state.auto_install_on_download,
                defaults.auto_install_on_download,
            ),
            verbose_startup_logging: bool_option(
                VERBOSE_STARTUP_ENV,
                state.verbose_startup_logging,
                defaults.verbose_startup_logging,
            ),
            check_updates_on_startup: bool_option(
                STARTUP_UPDATE_CHECK_ENV,
                state.check_updates_on_startup,
                defaults.check_updates_on_startup,
            ),
        }
    }

    pub(crate) fn app_host(&self) -> Option<&str> {
        self.app_url.host_str()
    }
}

fn read_state_file(path: &Path) -> Option<DesktopStateFile> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
        Err(error) => {
            append_startup_log(&format!(
                "failed to read desktop state {}: {}",
                path.display(),
                error
            ));
            return None;
        }
    };

    match serde_json::from_str::<DesktopStateFile>(&raw) {
        Ok(state) => Some(state),
        Err(error) => {
            append_startup_log(&format!(
                "failed to parse desktop state {}: {}. using defaults",
                path.display(),
                error
            ));
            None
        }
    }
}

fn default_app_url() -> Url {
    Url::parse(DEFAULT_APP_URL).expect("DEFAULT_APP_URL is a valid URL")
}

pub(crate) fn normalize_app_url(raw: &str) -> Url {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default_app_url();
    }

    match Url::parse(trimmed) {
        Ok(mut parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            if parsed.path().is_empty() {
                parsed.set_path("/");
            }
            parsed
        }
        _ => default_app_url(),
    }
}

pub(crate) fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn desktop_state_path(root_dir: Option<&Path>) -> Option<PathBuf> {
    root_dir.map(|root| root.join(DESKTOP_STATE_FILE))
}
