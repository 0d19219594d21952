//! Update check state machine.
//!
//! Every check is issued through [`UpdateLifecycle::begin_check`], which hands
//! out a [`CheckTicket`] carrying the check's origin. Updater events are fed
//! back together with their ticket, so whether a dialog is shown depends on
//! the check that produced the event rather than on shared mutable flags.
//! The machine only decides; `update_flow` executes the returned effects.

use crate::APP_NAME;

pub const RESTART_NOW_BUTTON: usize = 0;
pub const LATER_BUTTON: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOrigin {
    Manual,
    Automatic,
}

impl CheckOrigin {
    fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket {
    id: u64,
    origin: CheckOrigin,
}

impl CheckTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn origin(&self) -> CheckOrigin {
        self.origin
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckRejected {
    CheckInProgress,
    DownloadInProgress { version: String },
    InstallPending { version: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub version: String,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub percent: f64,
    pub transferred: u64,
    pub total: Option<u64>,
    pub bytes_per_second: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdaterEvent {
    Checking,
    Available(UpdateInfo),
    NotAvailable,
    Error(String),
    Progress(DownloadProgress),
    Downloaded(UpdateInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    Checking { origin: CheckOrigin },
    Available { version: String },
    Downloading { version: String, percent: u8 },
    Downloaded { version: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEffect {
    Notify { title: String, body: String },
    ShowDialog(UpdateDialog),
    SetProgress(u8),
    ClearProgress,
    PromptRestart { version: String },
    InstallAndRelaunch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdatePolicy {
    pub auto_install_on_download: bool,
}

#[derive(Debug)]
pub struct UpdateLifecycle {
    policy: UpdatePolicy,
    current_version: String,
    phase: UpdatePhase,
    active: Option<CheckTicket>,
    next_id: u64,
    last_progress_decade: Option<u8>,
}

impl UpdateLifecycle {
    pub fn new(policy: UpdatePolicy, current_version: impl Into<String>) -> Self {
        Self {
            policy,
            current_version: current_version.into(),
            phase: UpdatePhase::Idle,
            active: None,
            next_id: 0,
            last_progress_decade: None,
        }
    }

    pub fn phase(&self) -> &UpdatePhase {
        &self.phase
    }

    /// The manual-check flag: true only while a user-initiated check is unresolved.
    pub fn is_manual_check_pending(&self) -> bool {
        matches!(
            self.phase,
            UpdatePhase::Checking {
                origin: CheckOrigin::Manual
            }
        )
    }

    pub fn begin_check(&mut self, origin: CheckOrigin) -> Result<CheckTicket, CheckRejected> {
        match &self.phase {
            UpdatePhase::Idle => {}
            UpdatePhase::Checking { .. } => return Err(CheckRejected::CheckInProgress),
            UpdatePhase::Available { version } | UpdatePhase::Downloading { version, .. } => {
                return Err(CheckRejected::DownloadInProgress {
                    version: version.clone(),
                });
            }
            UpdatePhase::Downloaded { version } => {
                return Err(CheckRejected::InstallPending {
                    version: version.clone(),
                });
            }
        }

        self.next_id += 1;
        let ticket = CheckTicket {
            id: self.next_id,
            origin,
        };
        self.active = Some(ticket);
        self.phase = UpdatePhase::Checking { origin };
        self.last_progress_decade = None;
        Ok(ticket)
    }

    pub fn handle_event<F>(
        &mut self,
        ticket: CheckTicket,
        event: UpdaterEvent,
        log: F,
    ) -> Vec<UpdateEffect>
    where
        F: Fn(&str),
    {
        if self.active != Some(ticket) {
            log(&format!(
                "ignoring updater event for stale check #{}: {:?}",
                ticket.id, event
            ));
            return Vec::new();
        }

        match event {
            UpdaterEvent::Checking => {
                log(&format!(
                    "checking for update: check=#{} origin={} current_version={}",
                    ticket.id,
                    ticket.origin.as_str(),
                    self.current_version
                ));
                Vec::new()
            }
            UpdaterEvent::Available(info) => self.on_available(info, log),
            UpdaterEvent::NotAvailable => self.on_not_available(ticket, log),
            UpdaterEvent::Error(message) => self.on_error(ticket, message, log),
            UpdaterEvent::Progress(progress) => self.on_progress(progress, log),
            UpdaterEvent::Downloaded(info) => self.on_downloaded(info, log),
        }
    }

    fn on_available<F: Fn(&str)>(&mut self, info: UpdateInfo, log: F) -> Vec<UpdateEffect> {
        log(&format!(
            "update available: version={} release_date={}",
            info.version,
            info.release_date.as_deref().unwrap_or("unknown")
        ));
        self.phase = UpdatePhase::Available {
            version: info.version.clone(),
        };

        vec![
            UpdateEffect::Notify {
                title: "Update Available".to_string(),
                body: format!(
                    "A new version of {APP_NAME} ({}) is available and will be downloaded in the background.",
                    info.version
                ),
            },
            UpdateEffect::ShowDialog(UpdateDialog {
                kind: DialogKind::Info,
                title: "Update Available".to_string(),
                message: format!("A new version of {APP_NAME} ({}) is available.", info.version),
                detail: "The update will be downloaded in the background and installed when ready."
                    .to_string(),
            }),
        ]
    }

    fn on_not_available<F: Fn(&str)>(&mut self, ticket: CheckTicket, log: F) -> Vec<UpdateEffect> {
        log(&format!(
            "update not available: current_version={}",
            self.current_version
        ));
        self.finish_check();

        if ticket.origin != CheckOrigin::Manual {
            return Vec::new();
        }
        vec![UpdateEffect::ShowDialog(UpdateDialog {
            kind: DialogKind::Info,
            title: "No Updates Available".to_string(),
            message: "You are already running the latest version.".to_string(),
            detail: format!("Current version: {}", self.current_version),
        })]
    }

    fn on_error<F: Fn(&str)>(
        &mut self,
        ticket: CheckTicket,
        message: String,
        log: F,
    ) -> Vec<UpdateEffect> {
        log(&format!("error in updater: {message}"));
        let had_progress = matches!(self.phase, UpdatePhase::Downloading { .. });
        self.finish_check();

        let mut effects = Vec::new();
        if had_progress {
            effects.push(UpdateEffect::ClearProgress);
        }
        if ticket.origin != CheckOrigin::Manual {
            return effects;
        }

        effects.push(UpdateEffect::Notify {
            title: "Update Error".to_string(),
            body: "There was an error while checking for updates. Please try again later."
                .to_string(),
        });
        effects.push(UpdateEffect::ShowDialog(UpdateDialog {
            kind: DialogKind::Error,
            title: "Update Error".to_string(),
            message: "Failed to check for updates.".to_string(),
            detail: format!(
                "Error: {message}\n\nPlease check your internet connection and try again later."
            ),
        }));
        effects
    }

    fn on_progress<F: Fn(&str)>(
        &mut self,
        progress: DownloadProgress,
        log: F,
    ) -> Vec<UpdateEffect> {
        let version = match &self.phase {
            UpdatePhase::Available { version } | UpdatePhase::Downloading { version, .. } => {
                version.clone()
            }
            other => {
                log(&format!("ignoring download progress while {other:?}"));
                return Vec::new();
            }
        };

        let total = progress
            .total
            .map(|total| total.to_string())
            .unwrap_or_else(|| "?".to_string());
        log(&format!(
            "Download speed: {} - Downloaded {:.1}% ({}/{})",
            progress.bytes_per_second, progress.percent, progress.transferred, total
        ));

        let percent = progress.percent.clamp(0.0, 100.0);
        self.phase = UpdatePhase::Downloading {
            version,
            percent: percent as u8,
        };

        let decade = progress_decade(percent);
        if self
            .last_progress_decade
            .is_some_and(|last| decade <= last)
        {
            return Vec::new();
        }
        self.last_progress_decade = Some(decade);
        vec![UpdateEffect::SetProgress(decade)]
    }

    fn on_downloaded<F: Fn(&str)>(&mut self, info: UpdateInfo, log: F) -> Vec<UpdateEffect> {
        log(&format!(
            "update downloaded: version={} release_date={}",
            info.version,
            info.release_date.as_deref().unwrap_or("unknown")
        ));
        self.phase = UpdatePhase::Downloaded {
            version: info.version.clone(),
        };
        self.active = None;
        self.last_progress_decade = None;

        let install_step = if self.policy.auto_install_on_download {
            UpdateEffect::InstallAndRelaunch
        } else {
            UpdateEffect::PromptRestart {
                version: info.version,
            }
        };

        vec![
            UpdateEffect::ClearProgress,
            UpdateEffect::Notify {
                title: "Update Ready".to_string(),
                body: format!(
                    "A new version of {APP_NAME} has been downloaded. It will be installed when you restart the application."
                ),
            },
            install_step,
        ]
    }

    /// Maps the restart dialog's button index to what should happen next.
    pub fn resolve_restart_choice(&self, button_index: usize) -> Vec<UpdateEffect> {
        if !matches!(self.phase, UpdatePhase::Downloaded { .. }) {
            return Vec::new();
        }
        match button_index {
            RESTART_NOW_BUTTON => vec![UpdateEffect::InstallAndRelaunch],
            _ => Vec::new(),
        }
    }

    fn finish_check(&mut self) {
        self.phase = UpdatePhase::Idle;
        self.active = None;
        self.last_progress_decade = None;
    }
}

/// What a user sees when their check could not be started.
pub fn effects_for_rejected_check(origin: CheckOrigin, rejected: &CheckRejected) -> Vec<UpdateEffect> {
    if origin != CheckOrigin::Manual {
        return Vec::new();
    }

    match rejected {
        CheckRejected::CheckInProgress => vec![UpdateEffect::ShowDialog(UpdateDialog {
            kind: DialogKind::Info,
            title: "Checking for Updates".to_string(),
            message: "An update check is already in progress.".to_string(),
            detail: "You will be notified when it completes.".to_string(),
        })],
        CheckRejected::DownloadInProgress { version } => {
            vec![UpdateEffect::ShowDialog(UpdateDialog {
                kind: DialogKind::Info,
                title: "Update Downloading".to_string(),
                message: format!("{APP_NAME} {version} is being downloaded."),
                detail: "You will be asked to restart once the download finishes.".to_string(),
            })]
        }
        CheckRejected::InstallPending { version } => vec![UpdateEffect::PromptRestart {
            version: version.clone(),
        }],
    }
}

/// Whole decade (0, 10, ..., 100) reached by `percent`.
pub fn progress_decade(percent: f64) -> u8 {
    let clamped = percent.clamp(0.0, 100.0);
    ((clamped / 10.0).floor() as u8) * 10
}

pub fn restart_prompt(version: &str) -> UpdateDialog {
    UpdateDialog {
        kind: DialogKind::Info,
        title: "Update Ready".to_string(),
        message: format!("{APP_NAME} {version} has been downloaded."),
        detail: "The update will be installed when you restart the application. Would you like to restart now?"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn lifecycle() -> UpdateLifecycle {
        UpdateLifecycle::new(UpdatePolicy::default(), "1.2.0")
    }

    fn info(version: &str) -> UpdateInfo {
        UpdateInfo {
            version: version.to_string(),
            release_date: Some("2026-10-01".to_string()),
        }
    }

    fn progress(percent: f64) -> UpdaterEvent {
        UpdaterEvent::Progress(DownloadProgress {
            percent,
            transferred: (percent * 1000.0) as u64,
            total: Some(100_000),
            bytes_per_second: 4096,
        })
    }

    fn dialogs(effects: &[UpdateEffect]) -> usize {
        effects
            .iter()
            .filter(|effect| matches!(effect, UpdateEffect::ShowDialog(_)))
            .count()
    }

    fn installs(effects: &[UpdateEffect]) -> usize {
        effects
            .iter()
            .filter(|effect| matches!(effect, UpdateEffect::InstallAndRelaunch))
            .count()
    }

    #[test]
    fn manual_flag_starts_false() {
        assert!(!lifecycle().is_manual_check_pending());
    }

    #[test]
    fn manual_flag_clears_after_every_check_resolution() {
        let outcomes = [
            UpdaterEvent::Available(info("1.3.0")),
            UpdaterEvent::NotAvailable,
            UpdaterEvent::Error("network down".to_string()),
        ];

        for outcome in outcomes {
            let mut machine = lifecycle();
            let ticket = machine
                .begin_check(CheckOrigin::Manual)
                .expect("check should start");
            assert!(machine.is_manual_check_pending());

            machine.handle_event(ticket, UpdaterEvent::Checking, |_| {});
            machine.handle_event(ticket, outcome, |_| {});
            assert!(!machine.is_manual_check_pending());
        }
    }

    #[test]
    fn not_available_is_silent_for_automatic_checks() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        let effects = machine.handle_event(ticket, UpdaterEvent::NotAvailable, |_| {});
        assert_eq!(dialogs(&effects), 0);
        assert_eq!(machine.phase(), &UpdatePhase::Idle);
    }

    #[test]
    fn not_available_shows_one_dialog_for_manual_checks() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Manual).expect("start");
        let effects = machine.handle_event(ticket, UpdaterEvent::NotAvailable, |_| {});
        assert_eq!(dialogs(&effects), 1);
        match &effects[0] {
            UpdateEffect::ShowDialog(dialog) => {
                assert_eq!(dialog.title, "No Updates Available");
                assert_eq!(dialog.detail, "Current version: 1.2.0");
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn errors_are_logged_always_but_surfaced_only_for_manual_checks() {
        let logged = RefCell::new(Vec::new());
        let log = |line: &str| logged.borrow_mut().push(line.to_string());

        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        let effects = machine.handle_event(ticket, UpdaterEvent::Error("timeout".into()), log);
        assert!(effects.is_empty());
        assert!(logged.borrow().iter().any(|line| line.contains("timeout")));

        let ticket = machine.begin_check(CheckOrigin::Manual).expect("restart");
        let effects = machine.handle_event(ticket, UpdaterEvent::Error("timeout".into()), log);
        assert_eq!(dialogs(&effects), 1);
        let detail = effects.iter().find_map(|effect| match effect {
            UpdateEffect::ShowDialog(dialog) => Some(dialog.detail.clone()),
            _ => None,
        });
        assert!(detail.is_some_and(|detail| detail.starts_with("Error: timeout")));
        assert_eq!(machine.phase(), &UpdatePhase::Idle);
    }

    #[test]
    fn available_notifies_and_shows_dialog_for_any_origin() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        let effects = machine.handle_event(ticket, UpdaterEvent::Available(info("1.3.0")), |_| {});

        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], UpdateEffect::Notify { .. }));
        match &effects[1] {
            UpdateEffect::ShowDialog(dialog) => assert!(dialog.message.contains("1.3.0")),
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(
            machine.phase(),
            &UpdatePhase::Available {
                version: "1.3.0".to_string()
            }
        );
    }

    #[test]
    fn progress_updates_are_throttled_to_whole_decades() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        machine.handle_event(ticket, UpdaterEvent::Available(info("1.3.0")), |_| {});

        let mut reported = Vec::new();
        for percent in [0.0, 3.5, 9.9, 10.0, 12.0, 47.3, 48.0, 99.9, 100.0] {
            for effect in machine.handle_event(ticket, progress(percent), |_| {}) {
                if let UpdateEffect::SetProgress(decade) = effect {
                    reported.push(decade);
                }
            }
        }

        assert_eq!(reported, vec![0, 10, 40, 90, 100]);
        assert_eq!(
            machine.phase(),
            &UpdatePhase::Downloading {
                version: "1.3.0".to_string(),
                percent: 100
            }
        );
    }

    #[test]
    fn downloaded_prompts_by_default_and_restart_choice_drives_install() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        machine.handle_event(ticket, UpdaterEvent::Available(info("1.3.0")), |_| {});
        let effects = machine.handle_event(ticket, UpdaterEvent::Downloaded(info("1.3.0")), |_| {});

        assert_eq!(effects[0], UpdateEffect::ClearProgress);
        assert_eq!(
            effects.last(),
            Some(&UpdateEffect::PromptRestart {
                version: "1.3.0".to_string()
            })
        );
        assert_eq!(installs(&effects), 0);

        assert_eq!(installs(&machine.resolve_restart_choice(RESTART_NOW_BUTTON)), 1);
        assert_eq!(installs(&machine.resolve_restart_choice(LATER_BUTTON)), 0);
    }

    #[test]
    fn downloaded_installs_immediately_when_policy_says_so() {
        let mut machine = UpdateLifecycle::new(
            UpdatePolicy {
                auto_install_on_download: true,
            },
            "1.2.0",
        );
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        machine.handle_event(ticket, UpdaterEvent::Available(info("1.3.0")), |_| {});
        let effects = machine.handle_event(ticket, UpdaterEvent::Downloaded(info("1.3.0")), |_| {});

        assert_eq!(installs(&effects), 1);
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, UpdateEffect::PromptRestart { .. })));
    }

    #[test]
    fn restart_choice_is_ignored_without_downloaded_update() {
        let machine = lifecycle();
        assert!(machine.resolve_restart_choice(RESTART_NOW_BUTTON).is_empty());
    }

    #[test]
    fn overlapping_checks_are_rejected() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Automatic).expect("start");
        assert_eq!(
            machine.begin_check(CheckOrigin::Manual),
            Err(CheckRejected::CheckInProgress)
        );

        machine.handle_event(ticket, UpdaterEvent::Available(info("1.3.0")), |_| {});
        assert_eq!(
            machine.begin_check(CheckOrigin::Manual),
            Err(CheckRejected::DownloadInProgress {
                version: "1.3.0".to_string()
            })
        );

        machine.handle_event(ticket, UpdaterEvent::Downloaded(info("1.3.0")), |_| {});
        assert_eq!(
            machine.begin_check(CheckOrigin::Manual),
            Err(CheckRejected::InstallPending {
                version: "1.3.0".to_string()
            })
        );
    }

    #[test]
    fn stale_ticket_events_are_ignored() {
        let mut machine = lifecycle();
        let first = machine.begin_check(CheckOrigin::Manual).expect("start");
        machine.handle_event(first, UpdaterEvent::NotAvailable, |_| {});

        let second = machine.begin_check(CheckOrigin::Automatic).expect("restart");
        assert_ne!(first.id(), second.id());

        let effects = machine.handle_event(first, UpdaterEvent::Error("late".into()), |_| {});
        assert!(effects.is_empty());
        assert_eq!(
            machine.phase(),
            &UpdatePhase::Checking {
                origin: CheckOrigin::Automatic
            }
        );
    }

    #[test]
    fn download_error_after_manual_check_clears_progress_and_reports() {
        let mut machine = lifecycle();
        let ticket = machine.begin_check(CheckOrigin::Manual).expect("start");
        machine.handle_event(ticket, UpdaterEvent::Available(info("1.3.0")), |_| {});
        machine.handle_event(ticket, progress(30.0), |_| {});

        let effects = machine.handle_event(ticket, UpdaterEvent::Error("reset".into()), |_| {});
        assert_eq!(effects[0], UpdateEffect::ClearProgress);
        assert_eq!(dialogs(&effects), 1);
        assert_eq!(machine.phase(), &UpdatePhase::Idle);
    }

    #[test]
    fn rejected_checks_only_surface_for_manual_origin() {
        let pending = CheckRejected::InstallPending {
            version: "1.3.0".to_string(),
        };
        assert!(effects_for_rejected_check(CheckOrigin::Automatic, &pending).is_empty());
        assert_eq!(
            effects_for_rejected_check(CheckOrigin::Manual, &pending),
            vec![UpdateEffect::PromptRestart {
                version: "1.3.0".to_string()
            }]
        );
        assert_eq!(
            dialogs(&effects_for_rejected_check(
                CheckOrigin::Manual,
                &CheckRejected::CheckInProgress
            )),
            1
        );
    }

    #[test]
    fn progress_decade_floors_and_clamps() {
        assert_eq!(progress_decade(-5.0), 0);
        assert_eq!(progress_decade(19.99), 10);
        assert_eq!(progress_decade(100.0), 100);
        assert_eq!(progress_decade(250.0), 100);
    }
}
