//! Tab registry operations: create, close, clear, activate, reorder, and
//! the workspace commands built on them.

use super::{Notice, Workspace, WorkspaceCommand};
use crate::error::WorkspaceError;
use crate::tab::TabId;

impl Workspace {
    /// Create a tab at the end of the strip, activate it and start loading
    /// its picker.
    ///
    /// Tabs only exist while connected, so this is refused unless the node
    /// is `Running`.
    pub fn create_tab(&mut self) -> Result<TabId, WorkspaceError> {
        self.ensure_running()?;
        Ok(self.spawn_tab())
    }

    pub(super) fn spawn_tab(&mut self) -> TabId {
        let id = self.tabs.new_tab();
        self.notice(Notice::TabCreated(id));
        self.notice(Notice::TabActivated(id));
        self.start_picker_load(id);
        id
    }

    /// Close a tab, closing its session first.
    ///
    /// Closing an unknown or already-closed tab is a no-op. If this empties
    /// the workspace while connected, a replacement tab is created.
    pub fn close_tab(&mut self, id: TabId) -> Result<(), WorkspaceError> {
        if self.is_halted() {
            return Err(WorkspaceError::Halted);
        }

        let was_active = self.tabs.active_tab_id() == Some(id);
        self.release_prompt_for(id);
        let Some(closed) = self.tabs.close_tab(id) else {
            log::debug!("close_tab({}) ignored: no such tab", id);
            return Ok(());
        };

        if let Some(session) = closed.closed_session {
            self.notice(Notice::SessionClosed { tab: id, session });
        }
        self.notice(Notice::TabClosed(id));

        if self.tabs.is_empty() {
            if self.coordinator.is_running() {
                log::info!("Last tab closed while connected, opening a replacement");
                self.spawn_tab();
            }
        } else if was_active && let Some(active) = self.tabs.active_tab_id() {
            self.notice(Notice::TabActivated(active));
        }
        Ok(())
    }

    /// Silent teardown of every tab and session. Never creates a
    /// replacement tab.
    pub(super) fn clear_all(&mut self) {
        if self.arbiter.is_open() {
            self.arbiter.cancel();
            self.notice(Notice::PromptClosed);
        }

        let closed = self.tabs.clear_all();
        if closed.is_empty() {
            return;
        }
        for tab in &closed {
            if let Some(session) = tab.closed_session {
                self.notice(Notice::SessionClosed {
                    tab: tab.id,
                    session,
                });
            }
        }
        self.notice(Notice::TabsCleared(closed.len()));
    }

    /// Make `id` the active tab. Returns `false` if it does not exist.
    pub fn activate(&mut self, id: TabId) -> bool {
        if self.tabs.active_tab_id() == Some(id) {
            return true;
        }
        if self.tabs.switch_to(id) {
            self.notice(Notice::TabActivated(id));
            true
        } else {
            false
        }
    }

    /// Drag-reorder: `source` takes `destination`'s position.
    pub fn reorder(&mut self, source: TabId, destination: TabId) -> bool {
        if !self.tabs.reorder(source, destination) {
            return false;
        }
        self.notice_strip();
        true
    }

    /// Rename a tab. An empty title restores the positional default.
    pub fn rename_tab(&mut self, id: TabId, title: &str) -> Result<(), WorkspaceError> {
        let index = self
            .tabs
            .tabs()
            .iter()
            .position(|t| t.id == id)
            .ok_or(WorkspaceError::TabNotFound(id))?;
        let tab = self
            .tabs
            .get_tab_mut(id)
            .ok_or(WorkspaceError::TabNotFound(id))?;
        if title.trim().is_empty() {
            tab.has_default_title = true;
            tab.set_default_title(index + 1);
        } else {
            tab.set_title(title.trim());
        }
        let label = tab.label();
        self.notice(Notice::TabLabelChanged { tab: id, label });
        Ok(())
    }

    /// Run a workspace control.
    pub fn execute(&mut self, command: WorkspaceCommand) -> Result<(), WorkspaceError> {
        if self.is_halted() {
            return Err(WorkspaceError::Halted);
        }
        if !self.coordinator.controls_wired() {
            return Err(WorkspaceError::ControlsUnavailable);
        }

        match command {
            WorkspaceCommand::NewTab => {
                self.create_tab()?;
            }
            WorkspaceCommand::CloseActiveTab => {
                if let Some(id) = self.tabs.active_tab_id() {
                    self.close_tab(id)?;
                }
            }
            WorkspaceCommand::NextTab => {
                self.tabs.next_tab();
                self.notice_active();
            }
            WorkspaceCommand::PrevTab => {
                self.tabs.prev_tab();
                self.notice_active();
            }
            WorkspaceCommand::MoveActiveTabLeft => {
                if self.tabs.move_active_tab_left() {
                    self.notice_strip();
                }
            }
            WorkspaceCommand::MoveActiveTabRight => {
                if self.tabs.move_active_tab_right() {
                    self.notice_strip();
                }
            }
            WorkspaceCommand::SwitchToIndex(index) => {
                self.tabs.switch_to_index(index);
                self.notice_active();
            }
            WorkspaceCommand::Logout => match &self.node {
                Some(node) => {
                    log::info!("Logging out");
                    node.logout();
                }
                None => return Err(WorkspaceError::NotConnected),
            },
        }
        Ok(())
    }

    pub(super) fn ensure_running(&self) -> Result<(), WorkspaceError> {
        if self.is_halted() {
            Err(WorkspaceError::Halted)
        } else if !self.coordinator.is_running() {
            Err(WorkspaceError::NotConnected)
        } else {
            Ok(())
        }
    }

    fn notice_active(&mut self) {
        if let Some(id) = self.tabs.active_tab_id() {
            self.notice(Notice::TabActivated(id));
        }
    }

    fn notice_strip(&mut self) {
        let order = self.tabs.presentation_order().to_vec();
        self.notice(Notice::TabsReordered(order));
    }
}
