//! Picker loads, credential prompts and the per-tab session lifecycle.

use super::{Notice, Workspace, WorkspaceEvent};
use crate::error::{PromptError, WorkspaceError};
use crate::modal_arbiter::{PromptOutcome, PromptView, prefill_for};
use crate::session::{
    PresentationOptions, Session, SessionCallbacks, SessionId, SessionPhase, SessionTarget,
    SessionUpdate,
};
use crate::tab::TabId;
use meshterm_directory::{Device, DirectoryError};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

impl Workspace {
    /// Reload a tab's device list, e.g. after a directory error.
    pub fn reload_picker(&mut self, tab: TabId) -> Result<(), WorkspaceError> {
        self.ensure_running()?;
        if self.tabs.get_tab(tab).is_none() {
            return Err(WorkspaceError::TabNotFound(tab));
        }
        self.start_picker_load(tab);
        Ok(())
    }

    /// Set the picker's filter text. Filtering is local; nothing is fetched.
    pub fn set_picker_query(&mut self, tab: TabId, query: &str) -> Result<(), WorkspaceError> {
        let t = self
            .tabs
            .get_tab_mut(tab)
            .ok_or(WorkspaceError::TabNotFound(tab))?;
        t.controller.picker_mut().set_query(query);
        self.notice(Notice::PickerUpdated(tab));
        Ok(())
    }

    pub(super) fn start_picker_load(&mut self, tab: TabId) {
        let Some(t) = self.tabs.get_tab_mut(tab) else {
            return;
        };
        let load = t.controller.picker_mut().begin_load();
        self.notice(Notice::PickerUpdated(tab));

        let directory = Arc::clone(&self.directory);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || directory.fetch_devices())
                .await
                .unwrap_or_else(|e| {
                    Err(DirectoryError::Network(format!(
                        "directory fetch task failed: {}",
                        e
                    )))
                });
            let _ = tx.send(WorkspaceEvent::PickerLoaded { tab, load, result });
        });
        crate::debug_log!("PICKER", "tab {} load {} started", tab, load);
    }

    pub(super) fn handle_picker_loaded(
        &mut self,
        tab: TabId,
        load: u64,
        result: Result<Vec<Device>, DirectoryError>,
    ) {
        let Some(t) = self.tabs.get_tab_mut(tab) else {
            crate::debug_log!("PICKER", "dropping load {} for closed tab {}", load, tab);
            return;
        };
        if let Err(e) = &result {
            log::warn!("Device list for tab {} failed: {}", tab, e);
        }
        if t.controller.picker_mut().finish_load(load, result) {
            self.notice(Notice::PickerUpdated(tab));
        }
    }

    /// Start connecting `tab` to `device`.
    ///
    /// Returns `Ok(false)` without doing anything if the tab already has a
    /// session or a pending prompt, or if the device cannot be connected to.
    /// Otherwise the credential prompt is requested; the session is opened
    /// once the prompt is confirmed.
    pub fn open_session(&mut self, tab: TabId, device: &Device) -> Result<bool, WorkspaceError> {
        self.ensure_running()?;
        let t = self
            .tabs
            .get_tab_mut(tab)
            .ok_or(WorkspaceError::TabNotFound(tab))?;
        if !t.controller.can_request() {
            log::debug!("Tab {} already has a session or a pending request", tab);
            return Ok(false);
        }
        if !device.is_connectable() {
            log::debug!("Device {} is not connectable", device.name);
            return Ok(false);
        }

        let request = self.next_request;
        self.next_request += 1;
        t.controller.begin_prompt(request);

        let prefill = prefill_for(device, &self.login_names, &self.config);
        let pending = self.arbiter.prompt(tab, device, prefill);

        // A request the arbiter turned away resolves as cancelled; its tab
        // never shows a prompt
        if let Some(view) = self.arbiter.current().filter(|v| v.owner == tab) {
            let view = view.clone();
            self.notice(Notice::SessionPhaseChanged {
                tab,
                phase: SessionPhase::PromptingCredentials,
            });
            self.notice(Notice::PromptOpened(view));
        }

        let tx = self.tx.clone();
        let device = device.clone();
        tokio::spawn(async move {
            let outcome = pending.outcome().await;
            let _ = tx.send(WorkspaceEvent::PromptResolved {
                tab,
                request,
                device,
                outcome,
            });
        });
        Ok(true)
    }

    /// Open a session to a device from the tab's loaded picker, by name.
    pub fn open_session_by_name(&mut self, tab: TabId, name: &str) -> Result<bool, WorkspaceError> {
        let device = self
            .tabs
            .get_tab(tab)
            .ok_or(WorkspaceError::TabNotFound(tab))?
            .controller
            .picker()
            .device(name)
            .cloned();
        match device {
            Some(device) => self.open_session(tab, &device),
            None => Ok(false),
        }
    }

    /// The credential prompt currently shown, if any.
    pub fn current_prompt(&self) -> Option<&PromptView> {
        self.arbiter.current()
    }

    /// Confirm the open prompt. Blank input leaves the prompt open.
    pub fn confirm_prompt(&mut self, input: &str) -> Result<(), PromptError> {
        self.arbiter.confirm(input)?;
        self.notice(Notice::PromptClosed);
        Ok(())
    }

    pub fn cancel_prompt(&mut self) {
        if self.arbiter.is_open() {
            self.arbiter.cancel();
            self.notice(Notice::PromptClosed);
        }
    }

    pub(super) fn release_prompt_for(&mut self, tab: TabId) {
        if self.arbiter.current().is_some_and(|v| v.owner == tab) {
            self.arbiter.cancel_for(tab);
            self.notice(Notice::PromptClosed);
        }
    }

    pub(super) fn handle_prompt_resolved(
        &mut self,
        tab: TabId,
        request: u64,
        device: Device,
        outcome: PromptOutcome,
    ) {
        let Some(t) = self.tabs.get_tab_mut(tab) else {
            log::debug!("Prompt resolved for closed tab {}", tab);
            return;
        };
        if !t.controller.resolve_prompt(request) {
            log::debug!("Ignoring stale prompt request {} on tab {}", request, tab);
            return;
        }

        let login = match outcome {
            PromptOutcome::Confirmed(login) => login,
            PromptOutcome::Cancelled => {
                self.notice(Notice::SessionPhaseChanged {
                    tab,
                    phase: SessionPhase::Picker,
                });
                return;
            }
        };

        // Re-check everything that may have changed while the prompt was up
        if !t.controller.can_request() {
            log::debug!("Tab {} gained a session while prompting", tab);
            return;
        }
        let node = match &self.node {
            Some(node) if self.coordinator.is_running() => Arc::clone(node),
            _ => {
                log::debug!("Not connected any more, dropping session for tab {}", tab);
                return;
            }
        };

        self.login_names.set(device.identity(), &login);

        let id: SessionId = self.next_session;
        self.next_session += 1;
        let target = SessionTarget {
            address: device.connection_target().to_string(),
            login_name: login,
            timeout_secs: self.config.session_timeout_secs,
        };
        let options = PresentationOptions {
            title: format!("{}@{}", target.login_name, device.display_name),
        };
        let ended = Arc::new(AtomicBool::new(false));
        let callbacks = SessionCallbacks::new(tab, id, Arc::clone(&ended), self.tx.clone());

        log::info!(
            "Opening session {} on tab {} to {} as {}",
            id,
            tab,
            target.address,
            target.login_name
        );
        let handle = self
            .opener
            .open(tab, target.clone(), node, callbacks, options);

        let Some(t) = self.tabs.get_tab_mut(tab) else {
            return;
        };
        t.controller.picker_mut().set_session_message(None);
        t.controller
            .attach(Session::new(id, device, target, ended, handle));
        self.notice(Notice::SessionPhaseChanged {
            tab,
            phase: SessionPhase::Connecting,
        });
    }

    pub(super) fn handle_session_update(
        &mut self,
        tab: TabId,
        session: SessionId,
        update: SessionUpdate,
    ) {
        let Some(t) = self.tabs.get_tab_mut(tab) else {
            crate::debug_log!("SESSION", "update for closed tab {}: {:?}", tab, update);
            return;
        };

        match update {
            SessionUpdate::Progress(message) => {
                crate::debug_trace!("SESSION", "session {} progress: {}", session, message);
                if t.controller.record_progress(session, message) {
                    let message = t
                        .controller
                        .session()
                        .and_then(|s| s.last_progress())
                        .unwrap_or_default()
                        .to_string();
                    self.notice(Notice::SessionProgress { tab, message });
                }
            }
            SessionUpdate::Connected => {
                if t.controller.mark_connected(session) {
                    log::info!("Session {} on tab {} connected", session, tab);
                    let label = t.label();
                    self.notice(Notice::SessionPhaseChanged {
                        tab,
                        phase: SessionPhase::Active,
                    });
                    self.notice(Notice::TabLabelChanged { tab, label });
                }
            }
            SessionUpdate::Error(error) => {
                log::warn!("Session {} on tab {} failed: {}", session, tab, error);
                if let Some(ended) = t.controller.end_session(session, Some(error.to_string())) {
                    log_uptime(&ended);
                    self.after_session_end(tab);
                }
            }
            SessionUpdate::Done => {
                log::info!("Session {} on tab {} finished", session, tab);
                if let Some(ended) = t.controller.end_session(session, None) {
                    log_uptime(&ended);
                    self.after_session_end(tab);
                }
            }
        }
    }

    fn after_session_end(&mut self, tab: TabId) {
        self.notice(Notice::SessionPhaseChanged {
            tab,
            phase: SessionPhase::Picker,
        });
        if let Some(t) = self.tabs.get_tab(tab) {
            let label = t.label();
            self.notice(Notice::TabLabelChanged { tab, label });
        }
        if self.coordinator.is_running() {
            self.start_picker_load(tab);
        }
    }

    /// Interactively close a tab's session and return it to the picker.
    /// Close failures are swallowed. Returns `false` if there was none.
    pub fn close_session(&mut self, tab: TabId) -> Result<bool, WorkspaceError> {
        let t = self
            .tabs
            .get_tab_mut(tab)
            .ok_or(WorkspaceError::TabNotFound(tab))?;
        let Some(mut session) = t.controller.detach_session() else {
            return Ok(false);
        };
        session.close();
        self.notice(Notice::SessionClosed {
            tab,
            session: session.id,
        });
        self.after_session_end(tab);
        Ok(true)
    }

    /// Drop the remembered login name for a device.
    pub fn forget_login_name(&mut self, device: &Device) {
        self.login_names.delete(device.identity());
        log::info!("Forgot login name for {}", device.identity());
    }
}

fn log_uptime(session: &Session) {
    if let Some(connected_at) = session.connected_at() {
        log::info!(
            "Session {} to {} was up for {:.1?}",
            session.id,
            session.device.name,
            connected_at.elapsed()
        );
    }
}
