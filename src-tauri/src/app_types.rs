use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex, PoisonError,
};

use tauri::WebviewWindow;
use tokio::sync::Notify;
use tauri_plugin_updater::Update;

use crate::{
    shell_config::ShellConfig,
    splash_window::SplashLifecycle,
    update_lifecycle::{UpdateLifecycle, UpdatePolicy},
};

/// Process-wide window and tray handles owned by the bootstrap.
#[derive(Debug)]
pub(crate) struct ShellState {
    pub(crate) config: ShellConfig,
    main_window: Mutex<Option<WebviewWindow>>,
    splash: Mutex<SplashLifecycle>,
    main_window_generation: AtomicU64,
    main_window_revealed: AtomicBool,
    /// Woken when the main window finishes loading a real page.
    pub(crate) content_finished: Notify,
    tray_created: AtomicBool,
}

impl ShellState {
    pub(crate) fn new(config: ShellConfig) -> Self {
        Self {
            config,
            main_window: Mutex::new(None),
            splash: Mutex::new(SplashLifecycle::default()),
            main_window_generation: AtomicU64::new(0),
            main_window_revealed: AtomicBool::new(false),
            content_finished: Notify::new(),
            tray_created: AtomicBool::new(false),
        }
    }

    pub(crate) fn current_main_window(&self) -> Option<WebviewWindow> {
        self.main_window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stores the new main window and returns its generation.
    pub(crate) fn set_main_window(&self, window: WebviewWindow) -> u64 {
        *self.main_window.lock().unwrap_or_else(PoisonError::into_inner) = Some(window);
        self.begin_main_window_generation()
    }

    fn begin_main_window_generation(&self) -> u64 {
        self.main_window_revealed.store(false, Ordering::Release);
        self.main_window_generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn clear_main_window(&self) -> bool {
        self.main_window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// True exactly once per main window, on its first ready signal.
    pub(crate) fn mark_main_window_revealed(&self) -> bool {
        self.main_window_revealed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Reveal claim for the watchdog of window `generation`; false once that
    /// window was revealed or replaced.
    pub(crate) fn claim_overdue_reveal(&self, generation: u64) -> bool {
        self.main_window_generation.load(Ordering::Acquire) == generation
            && self.mark_main_window_revealed()
    }

    pub(crate) fn with_splash<R>(&self, f: impl FnOnce(&mut SplashLifecycle) -> R) -> R {
        let mut guard = self.splash.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// True only for the first caller; the tray lives until process exit.
    pub(crate) fn claim_tray_creation(&self) -> bool {
        self.tray_created
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl BridgeResult {
    pub(crate) fn from_result(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                reason: None,
            },
            Err(reason) => Self {
                ok: false,
                reason: Some(reason),
            },
        }
    }
}

/// A downloaded update waiting for the user to restart.
pub(crate) struct PendingInstall {
    pub(crate) update: Update,
    pub(crate) bytes: Vec<u8>,
}

pub(crate) struct UpdateState {
    pub(crate) lifecycle: Mutex<UpdateLifecycle>,
    pending_install: Mutex<Option<PendingInstall>>,
}

impl UpdateState {
    pub(crate) fn new(policy: UpdatePolicy, current_version: String) -> Self {
        Self {
            lifecycle: Mutex::new(UpdateLifecycle::new(policy, current_version)),
            pending_install: Mutex::new(None),
        }
    }

    pub(crate) fn with_lifecycle<R>(&self, f: impl FnOnce(&mut UpdateLifecycle) -> R) -> R {
        let mut guard = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn store_pending_install(&self, pending: PendingInstall) {
        *self
            .pending_install
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(pending);
    }

    pub(crate) fn has_pending_install(&self) -> bool {
        self.pending_install
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn take_pending_install(&self) -> Option<PendingInstall> {
        self.pending_install
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
