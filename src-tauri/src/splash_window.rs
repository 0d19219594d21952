use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};

use crate::{ShellState, APP_NAME, SPLASH_PAGE, SPLASH_WINDOW_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplashPhase {
    #[default]
    NotShown,
    Showing,
    Closed,
}

/// One-shot splash bookkeeping: shown at most once, closed at most once.
#[derive(Debug, Default)]
pub struct SplashLifecycle {
    phase: SplashPhase,
}

impl SplashLifecycle {
    pub fn phase(&self) -> SplashPhase {
        self.phase
    }

    /// Returns true if the caller should create the splash window.
    pub fn begin_show(&mut self) -> bool {
        if self.phase != SplashPhase::NotShown {
            return false;
        }
        self.phase = SplashPhase::Showing;
        true
    }

    /// Returns true if there is a splash window left to close.
    pub fn begin_close(&mut self) -> bool {
        let was_showing = self.phase == SplashPhase::Showing;
        self.phase = SplashPhase::Closed;
        was_showing
    }
}

pub fn show_splash<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let state = app_handle.state::<ShellState>();
    if !state.with_splash(SplashLifecycle::begin_show) {
        log(&format!(
            "splash skipped, already {:?}",
            state.with_splash(|splash| splash.phase())
        ));
        return;
    }

    let builder = WebviewWindowBuilder::new(
        app_handle,
        SPLASH_WINDOW_LABEL,
        WebviewUrl::App(SPLASH_PAGE.into()),
    )
    .title(APP_NAME)
    .inner_size(500.0, 300.0)
    .decorations(false)
    .always_on_top(true)
    .resizable(false)
    .skip_taskbar(true)
    .center();

    if let Err(error) = builder.build() {
        log(&format!("failed to create splash window: {error}"));
        state.with_splash(SplashLifecycle::begin_close);
    }
}

pub fn close_splash<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let state = app_handle.state::<ShellState>();
    if !state.with_splash(SplashLifecycle::begin_close) {
        return;
    }

    if let Some(window) = app_handle.get_webview_window(SPLASH_WINDOW_LABEL) {
        if let Err(error) = window.close() {
            log(&format!("failed to close splash window: {error}"));
        }
    }
}
