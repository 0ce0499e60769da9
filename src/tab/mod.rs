//! Tab management for the remote-shell workspace
//!
//! This module provides:
//! - `Tab`: one unit of workspace UI, owning one session controller
//! - `TabManager`: the ordered tab registry and its presentation strip
//! - `TabId`: unique, never-reused identifier for each tab
//! - `reorder`: the pure drag-reorder rule

mod manager;
pub mod reorder;

pub use manager::{ClosedTab, TabManager};

use crate::session::{SessionController, SessionPhase};

/// Unique identifier for a tab, strictly increasing over the process lifetime
pub type TabId = u64;

/// A single workspace tab
#[derive(Debug)]
pub struct Tab {
    /// Unique identifier for this tab
    pub id: TabId,
    /// Placeholder title, "Tab N" by position until the user renames it
    pub title: String,
    /// Whether `title` is still the positional default
    pub has_default_title: bool,
    /// Picker / session state for this tab
    pub controller: SessionController,
}

impl Tab {
    /// Create a tab in picker mode
    pub fn new(id: TabId, tab_number: usize) -> Self {
        Self {
            id,
            title: format!("Tab {}", tab_number),
            has_default_title: true,
            controller: SessionController::new(),
        }
    }

    /// Update the default title to reflect the tab's position
    pub fn set_default_title(&mut self, tab_number: usize) {
        if self.has_default_title {
            self.title = format!("Tab {}", tab_number);
        }
    }

    /// Explicitly set the tab title
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.has_default_title = false;
    }

    /// Label shown in the tab strip: the session identity once connected,
    /// otherwise the title.
    pub fn label(&self) -> String {
        match self.controller.session() {
            Some(session) if self.controller.phase() == SessionPhase::Active => session.label(),
            _ => self.title.clone(),
        }
    }

    /// Whether this tab holds a session that has not ended
    pub fn has_live_session(&self) -> bool {
        self.controller.has_live_session()
    }
}
