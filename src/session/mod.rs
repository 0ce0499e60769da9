//! Per-tab remote-session lifecycle.
//!
//! Every tab owns one [`SessionController`]. It starts in
//! [`SessionPhase::Picker`], moves through credential entry and connection,
//! and returns to `Picker` when the session ends; the tab is reused, not
//! destroyed.

pub mod opener;

use crate::picker::Picker;
use meshterm_directory::Device;
use opener::SessionHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub use opener::{
    PresentationOptions, SessionCallbacks, SessionOpener, SessionTarget, SessionUpdate,
};

/// Unique identifier of a session within the workspace
pub type SessionId = u64;

/// Lifecycle phase of a tab's session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Picker,
    PromptingCredentials,
    Connecting,
    Active,
    Ended,
}

/// A remote-shell session owned by one tab.
pub struct Session {
    pub id: SessionId,
    pub device: Device,
    pub target: SessionTarget,
    phase: SessionPhase,
    handle: Option<Box<dyn SessionHandle>>,
    /// Shared with the callbacks; set once the session has ended
    ended: Arc<AtomicBool>,
    last_progress: Option<String>,
    connected_at: Option<Instant>,
}

impl Session {
    pub fn new(
        id: SessionId,
        device: Device,
        target: SessionTarget,
        ended: Arc<AtomicBool>,
        handle: Box<dyn SessionHandle>,
    ) -> Self {
        Self {
            id,
            device,
            target,
            phase: SessionPhase::Connecting,
            handle: Some(handle),
            ended,
            last_progress: None,
            connected_at: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn last_progress(&self) -> Option<&str> {
        self.last_progress.as_deref()
    }

    pub fn connected_at(&self) -> Option<Instant> {
        self.connected_at
    }

    /// Label shown on the owning tab.
    pub fn label(&self) -> String {
        format!("{}@{}", self.target.login_name, self.device.display_name)
    }

    /// Best-effort close. Failures are logged, never returned.
    pub fn close(&mut self) {
        self.ended.store(true, Ordering::SeqCst);
        if let Some(mut handle) = self.handle.take() {
            match handle.close() {
                Ok(()) => log::info!("Closed session {} to {}", self.id, self.device.name),
                Err(e) => log::warn!("Ignoring close failure for session {}: {}", self.id, e),
            }
        }
        self.phase = SessionPhase::Ended;
    }

    fn mark_ended(&mut self) {
        self.ended.store(true, Ordering::SeqCst);
        self.handle = None;
        self.phase = SessionPhase::Ended;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("device", &self.device.name)
            .field("phase", &self.phase)
            .finish()
    }
}

/// Session state machine for one tab.
#[derive(Debug, Default)]
pub struct SessionController {
    phase: SessionPhase,
    /// Credential request currently awaiting the prompt
    pending_request: Option<u64>,
    session: Option<Session>,
    picker: Picker,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut Picker {
        &mut self.picker
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a non-ended session is attached.
    pub fn has_live_session(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.phase() != SessionPhase::Ended)
    }

    /// Whether a new connect request may start right now.
    pub fn can_request(&self) -> bool {
        self.phase == SessionPhase::Picker && !self.has_live_session()
    }

    pub fn begin_prompt(&mut self, request: u64) {
        self.pending_request = Some(request);
        self.phase = SessionPhase::PromptingCredentials;
    }

    /// Consume the pending request if it is `request`, returning to `Picker`.
    /// Returns `false` for a stale or unknown request.
    pub fn resolve_prompt(&mut self, request: u64) -> bool {
        if self.pending_request != Some(request) {
            return false;
        }
        self.pending_request = None;
        if self.phase == SessionPhase::PromptingCredentials {
            self.phase = SessionPhase::Picker;
        }
        true
    }

    /// Attach a freshly opened session.
    pub fn attach(&mut self, session: Session) {
        self.phase = session.phase();
        self.session = Some(session);
    }

    fn live_session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.session
            .as_mut()
            .filter(|s| s.id == id && s.phase() != SessionPhase::Ended)
    }

    /// Record a progress message. Does not change the phase.
    pub fn record_progress(&mut self, id: SessionId, message: String) -> bool {
        match self.live_session_mut(id) {
            Some(session) => {
                session.last_progress = Some(message);
                true
            }
            None => false,
        }
    }

    /// Promote `Connecting` to `Active`.
    pub fn mark_connected(&mut self, id: SessionId) -> bool {
        let Some(session) = self.live_session_mut(id) else {
            return false;
        };
        if session.phase != SessionPhase::Connecting {
            return false;
        }
        session.phase = SessionPhase::Active;
        session.connected_at = Some(Instant::now());
        self.phase = SessionPhase::Active;
        true
    }

    /// End session `id` after an error or normal completion and hand the
    /// tab back to the picker. Returns the ended session, or `None` if `id`
    /// is not the live session.
    pub fn end_session(&mut self, id: SessionId, message: Option<String>) -> Option<Session> {
        self.live_session_mut(id)?;
        let mut session = self.session.take()?;
        session.mark_ended();
        self.phase = SessionPhase::Picker;
        self.picker.set_session_message(message);
        Some(session)
    }

    /// Detach the live session for an interactive close. The caller closes it.
    pub fn detach_session(&mut self) -> Option<Session> {
        let session = self.session.take()?;
        self.phase = SessionPhase::Picker;
        self.pending_request = None;
        Some(session)
    }
}
