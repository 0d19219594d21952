use std::time::{Duration, Instant};

use tauri::{
    window::{ProgressBarState, ProgressBarStatus},
    AppHandle, Manager,
};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_notification::NotificationExt;
use tauri_plugin_updater::{Update, UpdaterExt};

use crate::{
    append_update_log,
    update_lifecycle::{
        self, CheckOrigin, CheckTicket, DialogKind, DownloadProgress, UpdateDialog, UpdateEffect,
        UpdateInfo, UpdaterEvent, LATER_BUTTON, RESTART_NOW_BUTTON,
    },
    PendingInstall, ShellState, UpdateState,
};

pub(crate) fn spawn_update_check(app_handle: &AppHandle, origin: CheckOrigin) {
    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        run_update_check(app_handle.clone(), origin).await;
        let phase = app_handle
            .state::<UpdateState>()
            .with_lifecycle(|lifecycle| lifecycle.phase().clone());
        append_update_log(&format!("update cycle settled: {phase:?}"));
    });
}

async fn run_update_check(app_handle: AppHandle, origin: CheckOrigin) {
    let state = app_handle.state::<UpdateState>();
    let ticket = match state.with_lifecycle(|lifecycle| lifecycle.begin_check(origin)) {
        Ok(ticket) => ticket,
        Err(rejected) => {
            append_update_log(&format!("update check not started: {rejected:?}"));
            apply_effects(
                &app_handle,
                update_lifecycle::effects_for_rejected_check(origin, &rejected),
            );
            return;
        }
    };

    append_update_log(&format!(
        "update check #{} started: origin={:?} manual_check_pending={}",
        ticket.id(),
        ticket.origin(),
        state.with_lifecycle(|lifecycle| lifecycle.is_manual_check_pending())
    ));
    dispatch(&app_handle, ticket, UpdaterEvent::Checking);

    let updater = match app_handle.updater() {
        Ok(updater) => updater,
        Err(error) => {
            dispatch(
                &app_handle,
                ticket,
                UpdaterEvent::Error(format!("Failed to initialize updater: {error}")),
            );
            return;
        }
    };

    let check_started = Instant::now();
    let update = match updater.check().await {
        Ok(Some(update)) => update,
        Ok(None) => {
            append_update_log(&format!(
                "check finished: has_update=false elapsed_ms={}",
                check_started.elapsed().as_millis()
            ));
            dispatch(&app_handle, ticket, UpdaterEvent::NotAvailable);
            return;
        }
        Err(error) => {
            dispatch(&app_handle, ticket, UpdaterEvent::Error(error.to_string()));
            return;
        }
    };

    let info = update_info(&update);
    dispatch(&app_handle, ticket, UpdaterEvent::Available(info.clone()));

    let download_started = Instant::now();
    let mut transferred: u64 = 0;
    let bytes = match update
        .download(
            |chunk_length, content_length| {
                transferred = transferred.saturating_add(chunk_length as u64);
                let progress =
                    download_progress(transferred, content_length, download_started.elapsed());
                dispatch(&app_handle, ticket, UpdaterEvent::Progress(progress));
            },
            || {},
        )
        .await
    {
        Ok(bytes) => bytes,
        Err(error) => {
            dispatch(
                &app_handle,
                ticket,
                UpdaterEvent::Error(format!("Failed to download update: {error}")),
            );
            return;
        }
    };

    state.store_pending_install(PendingInstall { update, bytes });
    dispatch(&app_handle, ticket, UpdaterEvent::Downloaded(info));
}

fn update_info(update: &Update) -> UpdateInfo {
    UpdateInfo {
        version: update.version.clone(),
        release_date: update.date.map(|date| date.to_string()),
    }
}

fn download_progress(transferred: u64, total: Option<u64>, elapsed: Duration) -> DownloadProgress {
    let percent = match total {
        Some(total) if total > 0 => (transferred as f64 / total as f64) * 100.0,
        _ => 0.0,
    };
    let elapsed_secs = elapsed.as_secs_f64();
    let bytes_per_second = if elapsed_secs > 0.0 {
        (transferred as f64 / elapsed_secs) as u64
    } else {
        0
    };

    DownloadProgress {
        percent,
        transferred,
        total,
        bytes_per_second,
    }
}

fn dispatch(app_handle: &AppHandle, ticket: CheckTicket, event: UpdaterEvent) {
    let state = app_handle.state::<UpdateState>();
    let effects = state
        .with_lifecycle(|lifecycle| lifecycle.handle_event(ticket, event, append_update_log));
    apply_effects(app_handle, effects);
}

fn apply_effects(app_handle: &AppHandle, effects: Vec<UpdateEffect>) {
    for effect in effects {
        match effect {
            UpdateEffect::Notify { title, body } => notify(app_handle, &title, &body),
            UpdateEffect::ShowDialog(dialog) => show_dialog(app_handle, &dialog),
            UpdateEffect::SetProgress(decade) => set_progress(
                app_handle,
                ProgressBarState {
                    status: Some(ProgressBarStatus::Normal),
                    progress: Some(u64::from(decade)),
                },
            ),
            UpdateEffect::ClearProgress => set_progress(
                app_handle,
                ProgressBarState {
                    status: Some(ProgressBarStatus::None),
                    progress: None,
                },
            ),
            UpdateEffect::PromptRestart { version } => prompt_restart(app_handle, &version),
            UpdateEffect::InstallAndRelaunch => {
                if let Err(error) = install_pending_update(app_handle) {
                    append_update_log(&error);
                    return;
                }
                app_handle.request_restart();
            }
        }
    }
}

fn notify(app_handle: &AppHandle, title: &str, body: &str) {
    if let Err(error) = app_handle
        .notification()
        .builder()
        .title(title)
        .body(body)
        .show()
    {
        append_update_log(&format!("failed to show notification '{title}': {error}"));
    }
}

fn dialog_kind(kind: DialogKind) -> MessageDialogKind {
    match kind {
        DialogKind::Info => MessageDialogKind::Info,
        DialogKind::Error => MessageDialogKind::Error,
    }
}

fn dialog_text(dialog: &UpdateDialog) -> String {
    format!("{}\n\n{}", dialog.message, dialog.detail)
}

fn show_dialog(app_handle: &AppHandle, dialog: &UpdateDialog) {
    let mut builder = app_handle
        .dialog()
        .message(dialog_text(dialog))
        .title(dialog.title.clone())
        .kind(dialog_kind(dialog.kind))
        .buttons(MessageDialogButtons::Ok);
    if let Some(window) = app_handle.state::<ShellState>().current_main_window() {
        builder = builder.parent(&window);
    }
    builder.show(|_| {});
}

fn prompt_restart(app_handle: &AppHandle, version: &str) {
    let prompt = update_lifecycle::restart_prompt(version);
    let mut builder = app_handle
        .dialog()
        .message(dialog_text(&prompt))
        .title(prompt.title.clone())
        .kind(dialog_kind(prompt.kind))
        .buttons(MessageDialogButtons::OkCancelCustom(
            "Restart Now".to_string(),
            "Later".to_string(),
        ));
    if let Some(window) = app_handle.state::<ShellState>().current_main_window() {
        builder = builder.parent(&window);
    }

    let button_index = if builder.blocking_show() {
        RESTART_NOW_BUTTON
    } else {
        LATER_BUTTON
    };
    append_update_log(&format!(
        "restart prompt for {version}: {}",
        if button_index == RESTART_NOW_BUTTON {
            "restart now"
        } else {
            "later, installing on exit"
        }
    ));

    let effects = app_handle
        .state::<UpdateState>()
        .with_lifecycle(|lifecycle| lifecycle.resolve_restart_choice(button_index));
    apply_effects(app_handle, effects);
}

fn set_progress(app_handle: &AppHandle, progress: ProgressBarState) {
    let Some(window) = app_handle.state::<ShellState>().current_main_window() else {
        return;
    };
    if let Err(error) = window.set_progress_bar(progress) {
        append_update_log(&format!("failed to update progress bar: {error}"));
    }
}

fn install_pending_update(app_handle: &AppHandle) -> Result<String, String> {
    let pending = app_handle
        .state::<UpdateState>()
        .take_pending_install()
        .ok_or_else(|| "No downloaded update is pending installation.".to_string())?;
    let version = pending.update.version.clone();
    pending
        .update
        .install(&pending.bytes)
        .map_err(|error| format!("Failed to install update {version}: {error}"))?;
    append_update_log(&format!("update {version} installed"));
    Ok(version)
}

/// Installs an update the user postponed with "Later"; called while the process exits.
pub(crate) fn install_pending_update_on_exit(app_handle: &AppHandle) {
    if app_handle
        .try_state::<UpdateState>()
        .is_none_or(|state| !state.has_pending_install())
    {
        return;
    }

    append_update_log("installing postponed update before exit");
    if let Err(error) = install_pending_update(app_handle) {
        append_update_log(&error);
    }
}
