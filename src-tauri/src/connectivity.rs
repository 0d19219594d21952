use std::{
    future::Future,
    io,
    net::{SocketAddr, ToSocketAddrs},
    time::Duration,
};

use tauri::{Manager, WebviewWindow};
use url::Url;

use crate::{
    append_desktop_log, main_window, ShellState, FALLBACK_PAGE, REACHABILITY_TIMEOUT_SECS,
    REMOTE_LOAD_TIMEOUT_SECS,
};

/// Outcome of a single name lookup against the app host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResolution {
    Reachable,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTarget {
    Remote,
    Fallback,
}

/// How a remote navigation the webview accepted actually ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLoadOutcome {
    Loaded,
    Failed(String),
    TimedOut,
}

/// Where the main window's content gets loaded.
pub trait ContentSurface {
    fn load_remote(&self, url: &Url) -> Result<(), String>;
    fn load_fallback(&self) -> Result<(), String>;
}

// Resolver messages for "no such host", as worded by glibc, musl, macOS and Windows.
const NOT_FOUND_MARKERS: [&str; 6] = [
    "name or service not known",
    "nodename nor servname provided",
    "no address associated with hostname",
    "no such host is known",
    "temporary failure in name resolution",
    "name does not resolve",
];

fn is_not_found_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::NotFound {
        return true;
    }
    let message = error.to_string().to_ascii_lowercase();
    NOT_FOUND_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

pub fn classify_lookup(result: io::Result<Vec<SocketAddr>>) -> HostResolution {
    match result {
        Ok(addrs) if addrs.is_empty() => HostResolution::NotFound,
        Ok(_) => HostResolution::Reachable,
        Err(error) if is_not_found_error(&error) => HostResolution::NotFound,
        Err(error) => HostResolution::Failed(error.to_string()),
    }
}

/// Blocking; run it off the main thread.
pub fn resolve_host(host: &str, port: u16) -> HostResolution {
    classify_lookup(
        (host, port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>()),
    )
}

pub fn content_target_for(resolution: &HostResolution) -> ContentTarget {
    match resolution {
        HostResolution::NotFound => ContentTarget::Fallback,
        HostResolution::Reachable | HostResolution::Failed(_) => ContentTarget::Remote,
    }
}

pub fn load_app_content<S, F>(
    surface: &S,
    resolution: &HostResolution,
    app_url: &Url,
    log: F,
) -> ContentTarget
where
    S: ContentSurface,
    F: Fn(&str),
{
    match content_target_for(resolution) {
        ContentTarget::Fallback => {
            log("app host not found, loading offline page");
            if let Err(error) = surface.load_fallback() {
                log(&format!("failed to load offline page: {error}"));
            }
            ContentTarget::Fallback
        }
        ContentTarget::Remote => {
            if let HostResolution::Failed(reason) = resolution {
                log(&format!(
                    "app host lookup failed ({reason}), loading remote app anyway"
                ));
            } else {
                log(&format!("loading remote app {app_url}"));
            }

            match surface.load_remote(app_url) {
                Ok(()) => ContentTarget::Remote,
                Err(error) => {
                    log(&format!("failed to load remote app: {error}"));
                    if let Err(error) = surface.load_fallback() {
                        log(&format!("failed to load offline page: {error}"));
                    }
                    ContentTarget::Fallback
                }
            }
        }
    }
}

/// Second half of a remote load: `load_remote` only queues the navigation, so
/// a failure reported afterwards still swaps in the offline page.
pub fn settle_remote_load<S, F>(surface: &S, outcome: &RemoteLoadOutcome, log: F) -> ContentTarget
where
    S: ContentSurface,
    F: Fn(&str),
{
    let reason = match outcome {
        RemoteLoadOutcome::Loaded => return ContentTarget::Remote,
        RemoteLoadOutcome::Failed(reason) => reason.clone(),
        RemoteLoadOutcome::TimedOut => {
            format!("no page finished loading within {REMOTE_LOAD_TIMEOUT_SECS}s")
        }
    };

    log(&format!("remote app failed to load ({reason}), loading offline page"));
    if let Err(error) = surface.load_fallback() {
        log(&format!("failed to load offline page: {error}"));
    }
    ContentTarget::Fallback
}

/// Any HTTP response counts; only transport failures (TLS, refused, timeout) fail.
pub async fn check_http_reachability(app_url: &Url, timeout: Duration) -> Result<(), String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| format!("Failed to build http client: {error}"))?;
    client
        .head(app_url.clone())
        .send()
        .await
        .map(|response| {
            append_desktop_log(&format!(
                "app url answered with status {}",
                response.status()
            ));
        })
        .map_err(|error| format!("Failed to reach {app_url}: {error}"))
}

/// Resolves once the accepted navigation has either finished or failed.
pub async fn observe_remote_load<R, L>(
    reachability: R,
    page_finished: L,
    load_timeout: Duration,
) -> RemoteLoadOutcome
where
    R: Future<Output = Result<(), String>>,
    L: Future<Output = ()>,
{
    if let Err(reason) = reachability.await {
        return RemoteLoadOutcome::Failed(reason);
    }
    match tokio::time::timeout(load_timeout, page_finished).await {
        Ok(()) => RemoteLoadOutcome::Loaded,
        Err(_) => RemoteLoadOutcome::TimedOut,
    }
}

impl ContentSurface for WebviewWindow {
    fn load_remote(&self, url: &Url) -> Result<(), String> {
        self.navigate(url.clone())
            .map_err(|error| format!("Failed to navigate to {url}: {error}"))
    }

    fn load_fallback(&self) -> Result<(), String> {
        let fallback_url = main_window::bundled_page_url(FALLBACK_PAGE)?;
        self.navigate(fallback_url)
            .map_err(|error| format!("Failed to navigate to offline page: {error}"))
    }
}

/// Checks the app host in the background and loads the matching content into `window`.
pub(crate) fn spawn_app_content_load(window: WebviewWindow, app_url: Url) {
    tauri::async_runtime::spawn(async move {
        let Some(host) = app_url.host_str().map(str::to_string) else {
            append_desktop_log(&format!("app url {app_url} has no host, loading offline page"));
            if let Err(error) = window.load_fallback() {
                append_desktop_log(&format!("failed to load offline page: {error}"));
            }
            return;
        };
        let port = app_url.port_or_known_default().unwrap_or(443);

        let resolution = match tauri::async_runtime::spawn_blocking(move || {
            resolve_host(&host, port)
        })
        .await
        {
            Ok(resolution) => resolution,
            Err(error) => HostResolution::Failed(format!("lookup task failed: {error}")),
        };

        let state = window.state::<ShellState>();
        // Registered before navigating so an early finish is not missed.
        let page_finished = state.content_finished.notified();
        if load_app_content(&window, &resolution, &app_url, append_desktop_log)
            == ContentTarget::Fallback
        {
            return;
        }

        let outcome = observe_remote_load(
            check_http_reachability(&app_url, Duration::from_secs(REACHABILITY_TIMEOUT_SECS)),
            page_finished,
            Duration::from_secs(REMOTE_LOAD_TIMEOUT_SECS),
        )
        .await;
        settle_remote_load(&window, &outcome, append_desktop_log);
    });
}
