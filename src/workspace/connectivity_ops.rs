//! Node lifecycle: startup, notifications and coordinator actions.

use super::{Notice, Workspace};
use crate::connectivity::{CoordinatorAction, Overlay};
use crate::error::ConnectivityError;
use crate::node::{NodeBuilder, NodeNotification, NodeStateStore};
use std::sync::Arc;

impl Workspace {
    /// Construct the overlay node and start it.
    ///
    /// A construction failure is terminal: the workspace halts and the error
    /// is returned to the caller. No retry is attempted.
    pub fn start(&mut self, builder: &dyn NodeBuilder) -> Result<(), ConnectivityError> {
        if let Some(err) = self.coordinator.fatal_error() {
            return Err(err.clone());
        }
        if self.node.is_some() {
            log::warn!("Workspace already started");
            return Ok(());
        }

        let notifier = self.notifier();
        match builder.build(NodeStateStore::new(), notifier.clone()) {
            Ok(node) => {
                log::info!("Network node constructed, starting");
                self.node = Some(Arc::clone(&node));
                node.run(notifier);
                Ok(())
            }
            Err(e) => {
                let err = ConnectivityError::NodeStartup(format!("{:#}", e));
                let actions = self.coordinator.halt(err.clone());
                self.apply_actions(actions);
                Err(err)
            }
        }
    }

    pub(super) fn handle_node_notification(&mut self, notification: NodeNotification) {
        let actions = match notification {
            NodeNotification::State(state) => self.coordinator.on_state(state),
            NodeNotification::AuthUrl(url) => self.coordinator.on_auth_url(url),
            NodeNotification::NetworkMap(summary) => {
                if self.coordinator.on_network_map(summary) {
                    let title = self.title();
                    self.notice(Notice::TitleChanged(title));
                }
                Vec::new()
            }
            NodeNotification::Panic(message) => self.coordinator.on_panic(message),
        };
        self.apply_actions(actions);
    }

    pub(super) fn handle_login_due(&mut self, generation: u64) {
        if !self.login_trigger.take_due(generation) {
            crate::debug_log!("CONNECTIVITY", "stale login trigger {}", generation);
            return;
        }
        // Re-validate: a later notification may have made login unnecessary
        if self.is_halted() || !self.coordinator.state().requires_login() {
            return;
        }
        if let Some(node) = &self.node {
            log::info!("Triggering interactive login");
            node.login();
        }
    }

    fn apply_actions(&mut self, actions: Vec<CoordinatorAction>) {
        for action in actions {
            match action {
                CoordinatorAction::ClearAll => self.clear_all(),
                CoordinatorAction::ShowOverlay(overlay) => self.set_overlay(overlay),
                CoordinatorAction::ScheduleLogin => {
                    self.login_trigger.schedule(&self.tx);
                }
                CoordinatorAction::CancelLogin => self.login_trigger.cancel(),
                CoordinatorAction::WireControls => {
                    log::info!("Workspace controls wired");
                    self.notice(Notice::ControlsWired);
                }
                CoordinatorAction::EnsureOneTab => {
                    if self.tabs.is_empty() {
                        self.spawn_tab();
                    }
                }
                CoordinatorAction::Fatal(err) => {
                    crate::debug_error!("CONNECTIVITY", "workspace halted: {}", err);
                }
            }
        }
    }

    fn set_overlay(&mut self, overlay: Overlay) {
        if self.overlay != overlay {
            self.overlay = overlay.clone();
            self.notice(Notice::OverlayChanged(overlay));
        }
    }
}
