//! Connectivity state coordinator.
//!
//! Translates overlay-node notifications into workspace-wide actions. The
//! coordinator itself never touches tabs; it returns a list of
//! [`CoordinatorAction`]s that the workspace applies in order.
//!
//! Sub-modules:
//! - `login_trigger`: the debounced, cancellable call into the node's login

mod login_trigger;

pub use login_trigger::LoginTrigger;

use crate::error::ConnectivityError;
use crate::node::{ConnectivityState, NetworkMapSummary};

/// Blocking message shown over the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Waiting on the node; no interaction possible yet
    Loading(String),
    /// The user must authenticate, optionally by opening `auth_url`
    PendingAuth { auth_url: Option<String> },
    /// Non-fatal informational message
    Message(String),
    /// Workspace-fatal error; nothing further is offered
    Fatal(String),
    Hidden,
}

/// Workspace-level effect requested by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorAction {
    /// Close every session and remove every tab, without replacement
    ClearAll,
    ShowOverlay(Overlay),
    /// (Re)schedule the deferred login trigger
    ScheduleLogin,
    CancelLogin,
    /// One-time wiring of the workspace controls
    WireControls,
    /// Create a tab if the registry is empty
    EnsureOneTab,
    /// Enter the halted state
    Fatal(ConnectivityError),
}

/// Owner of the authoritative [`ConnectivityState`] and its latches.
#[derive(Debug, Default)]
pub struct ConnectivityCoordinator {
    state: ConnectivityState,
    /// Set the first time `Running` is observed, never cleared
    has_run: bool,
    /// Set once the workspace controls have been wired
    controls_wired: bool,
    halted: Option<ConnectivityError>,
    auth_url: Option<String>,
    network_map: Option<NetworkMapSummary>,
}

impl ConnectivityCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.halted.is_none() && self.state == ConnectivityState::Running
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn controls_wired(&self) -> bool {
        self.controls_wired
    }

    /// The error that halted the workspace, if any.
    pub fn fatal_error(&self) -> Option<&ConnectivityError> {
        self.halted.as_ref()
    }

    pub fn auth_url(&self) -> Option<&str> {
        self.auth_url.as_deref()
    }

    pub fn network_map(&self) -> Option<&NetworkMapSummary> {
        self.network_map.as_ref()
    }

    /// Handle a state notification.
    pub fn on_state(&mut self, state: ConnectivityState) -> Vec<CoordinatorAction> {
        if self.halted.is_some() {
            log::debug!("Ignoring state {} after fatal error", state);
            return Vec::new();
        }

        let previous = self.state;
        self.state = state;
        if previous != state {
            log::info!("Connectivity state: {} -> {}", previous, state);
        }

        match state {
            ConnectivityState::NeedsLogin | ConnectivityState::NeedsDeviceAuth => {
                if !previous.requires_login() {
                    // A URL from an earlier login flow is stale
                    self.auth_url = None;
                }
                vec![
                    CoordinatorAction::ClearAll,
                    CoordinatorAction::ShowOverlay(Overlay::PendingAuth {
                        auth_url: self.auth_url.clone(),
                    }),
                    CoordinatorAction::ScheduleLogin,
                ]
            }
            ConnectivityState::Running => {
                self.has_run = true;
                self.auth_url = None;
                let mut actions = vec![
                    CoordinatorAction::CancelLogin,
                    CoordinatorAction::ShowOverlay(Overlay::Hidden),
                ];
                if !self.controls_wired {
                    self.controls_wired = true;
                    actions.push(CoordinatorAction::WireControls);
                }
                actions.push(CoordinatorAction::EnsureOneTab);
                actions
            }
            ConnectivityState::Stopped if self.has_run => {
                self.halt(ConnectivityError::UnexpectedStop)
            }
            ConnectivityState::Stopped | ConnectivityState::Starting => vec![
                CoordinatorAction::CancelLogin,
                CoordinatorAction::ClearAll,
                CoordinatorAction::ShowOverlay(Overlay::Loading(
                    "Connecting to the network...".to_string(),
                )),
            ],
            ConnectivityState::Uninitialized => vec![
                CoordinatorAction::CancelLogin,
                CoordinatorAction::ClearAll,
                CoordinatorAction::ShowOverlay(Overlay::Loading("Starting...".to_string())),
            ],
            ConnectivityState::InUseElsewhere => vec![
                CoordinatorAction::CancelLogin,
                CoordinatorAction::ClearAll,
                CoordinatorAction::ShowOverlay(Overlay::Message(
                    "The network connection is in use by another session".to_string(),
                )),
            ],
        }
    }

    /// Handle an auth-URL notification. Never changes the state.
    pub fn on_auth_url(&mut self, url: String) -> Vec<CoordinatorAction> {
        if self.halted.is_some() {
            return Vec::new();
        }
        log::info!("Authentication URL received");
        self.auth_url = Some(url);
        if self.state.requires_login() {
            vec![CoordinatorAction::ShowOverlay(Overlay::PendingAuth {
                auth_url: self.auth_url.clone(),
            })]
        } else {
            Vec::new()
        }
    }

    /// Record the latest network map summary.
    pub fn on_network_map(&mut self, summary: NetworkMapSummary) -> bool {
        if self.halted.is_some() || self.network_map.as_ref() == Some(&summary) {
            return false;
        }
        log::debug!(
            "Network map: {} with {} peers",
            summary.self_name,
            summary.peer_count
        );
        self.network_map = Some(summary);
        true
    }

    /// Handle a panic notification; fatal at any time.
    pub fn on_panic(&mut self, message: String) -> Vec<CoordinatorAction> {
        self.halt(ConnectivityError::Panic(message))
    }

    /// Enter the halted state. Only the first fatal error is kept.
    pub fn halt(&mut self, error: ConnectivityError) -> Vec<CoordinatorAction> {
        if let Some(existing) = &self.halted {
            log::debug!("Ignoring fatal error after halt ({}): {}", existing, error);
            return Vec::new();
        }
        log::error!("Connectivity failure: {}", error);
        self.halted = Some(error.clone());
        vec![
            CoordinatorAction::CancelLogin,
            CoordinatorAction::ClearAll,
            CoordinatorAction::ShowOverlay(Overlay::Fatal(error.to_string())),
            CoordinatorAction::Fatal(error),
        ]
    }
}
