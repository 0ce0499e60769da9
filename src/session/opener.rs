//! Boundary with the session-open primitive.
//!
//! The primitive opens a remote shell into a presentation container and
//! reports progress through [`SessionCallbacks`]. Callbacks never touch
//! workspace state directly; they enqueue messages for the event loop.

use crate::error::SessionError;
use crate::node::OverlayNode;
use crate::session::SessionId;
use crate::tab::TabId;
use crate::workspace::WorkspaceEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Where and as whom to open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub address: String,
    pub login_name: String,
    pub timeout_secs: u64,
}

/// Presentation hints for the terminal view hosting the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationOptions {
    pub title: String,
}

/// Lifecycle report from the session-open primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Progress(String),
    Connected,
    Error(SessionError),
    Done,
}

/// Callback set handed to [`SessionOpener::open`].
///
/// `on_error` and `on_done` share one "already ended" flag: whichever fires
/// first is delivered, every later call is dropped.
#[derive(Clone)]
pub struct SessionCallbacks {
    tab: TabId,
    session: SessionId,
    ended: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<WorkspaceEvent>,
}

impl SessionCallbacks {
    pub(crate) fn new(
        tab: TabId,
        session: SessionId,
        ended: Arc<AtomicBool>,
        tx: mpsc::UnboundedSender<WorkspaceEvent>,
    ) -> Self {
        Self {
            tab,
            session,
            ended,
            tx,
        }
    }

    pub fn on_progress(&self, message: impl Into<String>) {
        if !self.ended.load(Ordering::SeqCst) {
            self.send(SessionUpdate::Progress(message.into()));
        }
    }

    pub fn on_connected(&self) {
        if !self.ended.load(Ordering::SeqCst) {
            self.send(SessionUpdate::Connected);
        }
    }

    pub fn on_error(&self, error: SessionError) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            self.send(SessionUpdate::Error(error));
        }
    }

    pub fn on_done(&self) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            self.send(SessionUpdate::Done);
        }
    }

    fn send(&self, update: SessionUpdate) {
        let event = WorkspaceEvent::Session {
            tab: self.tab,
            session: self.session,
            update,
        };
        if self.tx.send(event).is_err() {
            log::debug!("Dropping session update for tab {}: workspace is gone", self.tab);
        }
    }
}

/// Handle to an opened session.
pub trait SessionHandle: Send {
    /// Close the underlying connection.
    fn close(&mut self) -> Result<(), SessionError>;
}

/// The external session-open primitive.
pub trait SessionOpener: Send + Sync {
    /// Open a session rendered into the container of tab `container`.
    fn open(
        &self,
        container: TabId,
        target: SessionTarget,
        node: Arc<dyn OverlayNode>,
        callbacks: SessionCallbacks,
        options: PresentationOptions,
    ) -> Box<dyn SessionHandle>;
}
