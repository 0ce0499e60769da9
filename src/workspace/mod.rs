//! The workspace context: the single owner of all lifecycle state.
//!
//! Tabs, the connectivity coordinator, the prompt arbiter and the login-name
//! store live here and are only mutated from `&mut self` methods, one event
//! at a time. Collaborators (overlay node, directory, session opener) report
//! back exclusively by posting [`WorkspaceEvent`]s into the workspace's
//! channel, so every handler that resumes after a suspension point
//! re-validates its preconditions against current state.
//!
//! Sub-modules:
//! - `event`: the event and command types
//! - `notice`: the presentation feed
//! - `connectivity_ops`: node notifications and coordinator actions
//! - `tab_ops`: tab registry operations and workspace commands
//! - `session_ops`: picker loads, credential prompts and session lifecycle

mod connectivity_ops;
mod event;
mod notice;
mod session_ops;
mod tab_ops;

pub use event::{WorkspaceCommand, WorkspaceEvent};
pub use notice::Notice;

use crate::connectivity::{ConnectivityCoordinator, LoginTrigger, Overlay};
use crate::error::ConnectivityError;
use crate::modal_arbiter::ModalArbiter;
use crate::node::{NodeNotifier, OverlayNode};
use crate::session::{SessionId, SessionOpener};
use crate::tab::TabManager;
use meshterm_config::{Config, LoginNameStore};
use meshterm_directory::DeviceDirectory;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long [`Workspace::settle`] waits for another event before returning.
const SETTLE_IDLE: Duration = Duration::from_millis(50);

/// External collaborators and settings the workspace is built from.
pub struct WorkspaceDeps {
    pub config: Config,
    pub directory: Arc<dyn DeviceDirectory>,
    pub opener: Arc<dyn SessionOpener>,
    pub login_names: LoginNameStore,
}

/// Tabbed remote-shell workspace.
pub struct Workspace {
    config: Config,
    tabs: TabManager,
    coordinator: ConnectivityCoordinator,
    login_trigger: LoginTrigger,
    arbiter: ModalArbiter,
    login_names: LoginNameStore,
    directory: Arc<dyn DeviceDirectory>,
    opener: Arc<dyn SessionOpener>,
    node: Option<Arc<dyn OverlayNode>>,
    overlay: Overlay,
    notices: Vec<Notice>,
    next_request: u64,
    next_session: SessionId,
    tx: mpsc::UnboundedSender<WorkspaceEvent>,
    rx: mpsc::UnboundedReceiver<WorkspaceEvent>,
}

impl Workspace {
    pub fn new(deps: WorkspaceDeps) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let debounce = Duration::from_millis(deps.config.login_debounce_ms);
        Self {
            config: deps.config,
            tabs: TabManager::new(),
            coordinator: ConnectivityCoordinator::new(),
            login_trigger: LoginTrigger::new(debounce),
            arbiter: ModalArbiter::new(),
            login_names: deps.login_names,
            directory: deps.directory,
            opener: deps.opener,
            node: None,
            overlay: Overlay::Loading("Starting...".to_string()),
            notices: Vec::new(),
            next_request: 1,
            next_session: 1,
            tx,
            rx,
        }
    }

    /// Handler bundle that posts node notifications into this workspace.
    pub fn notifier(&self) -> NodeNotifier {
        NodeNotifier::new(self.tx.clone())
    }

    /// Sender for posting commands from outside the workspace.
    pub fn command_sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Handle one event. Stale or superseded completions are dropped here.
    pub fn handle_event(&mut self, event: WorkspaceEvent) {
        crate::debug_trace!("WORKSPACE", "event: {:?}", event);
        match event {
            WorkspaceEvent::Node(notification) => self.handle_node_notification(notification),
            WorkspaceEvent::LoginTriggerDue { generation } => self.handle_login_due(generation),
            WorkspaceEvent::PickerLoaded { tab, load, result } => {
                self.handle_picker_loaded(tab, load, result)
            }
            WorkspaceEvent::PromptResolved {
                tab,
                request,
                device,
                outcome,
            } => self.handle_prompt_resolved(tab, request, device, outcome),
            WorkspaceEvent::Session {
                tab,
                session,
                update,
            } => self.handle_session_update(tab, session, update),
            WorkspaceEvent::Command(command) => {
                if let Err(e) = self.execute(command) {
                    log::warn!("Command {:?} rejected: {}", command, e);
                }
            }
        }
    }

    /// Handle every event already queued, without waiting. Returns the count.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle events until none arrives for a short idle period.
    pub async fn settle(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(Some(event)) = tokio::time::timeout(SETTLE_IDLE, self.rx.recv()).await {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Run the event loop until a fatal connectivity error halts the
    /// workspace.
    pub async fn run(&mut self) -> Result<(), ConnectivityError> {
        if let Some(err) = self.coordinator.fatal_error() {
            return Err(err.clone());
        }
        // `self` keeps a sender alive, so `recv` only ends with the runtime
        while let Some(event) = self.rx.recv().await {
            self.handle_event(event);
            if let Some(err) = self.coordinator.fatal_error() {
                return Err(err.clone());
            }
        }
        Ok(())
    }

    /// Take all notices recorded since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn coordinator(&self) -> &ConnectivityCoordinator {
        &self.coordinator
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn arbiter(&self) -> &ModalArbiter {
        &self.arbiter
    }

    pub fn login_names(&self) -> &LoginNameStore {
        &self.login_names
    }

    pub fn is_halted(&self) -> bool {
        self.coordinator.fatal_error().is_some()
    }

    /// Workspace title, including the network map summary once known.
    pub fn title(&self) -> String {
        match self.coordinator.network_map() {
            Some(map) => format!("meshterm - {} ({} peers)", map.self_name, map.peer_count),
            None => "meshterm".to_string(),
        }
    }
}

/// Cloneable handle for posting [`WorkspaceCommand`]s into the event loop.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<WorkspaceEvent>,
}

impl CommandSender {
    /// Queue a command. Returns `false` if the workspace is gone.
    pub fn send(&self, command: WorkspaceCommand) -> bool {
        self.tx.send(WorkspaceEvent::Command(command)).is_ok()
    }
}
