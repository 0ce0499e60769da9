//! Tab registry: the ordered tab sequence, the active tab, and the tab strip
//! presented to the user.

use super::reorder::reorder;
use super::{Tab, TabId};
use crate::session::SessionId;

/// Result of removing a tab from the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedTab {
    /// The removed tab
    pub id: TabId,
    /// Session that was closed before the tab was removed, if any
    pub closed_session: Option<SessionId>,
}

/// Manages the ordered tabs of the workspace
#[derive(Debug)]
pub struct TabManager {
    /// All tabs, in logical order
    tabs: Vec<Tab>,
    /// Tab strip as presented, re-rendered from `tabs` after every mutation
    strip: Vec<TabId>,
    /// Currently active tab ID
    active_tab_id: Option<TabId>,
    /// Counter for generating unique tab IDs
    next_tab_id: TabId,
}

impl TabManager {
    /// Create a new empty tab manager
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            strip: Vec::new(),
            active_tab_id: None,
            next_tab_id: 1,
        }
    }

    /// Create a new tab at the end, activate it and return its ID
    pub fn new_tab(&mut self) -> TabId {
        let id = self.next_tab_id;
        self.next_tab_id += 1;

        // Tab number is based on current count, not unique ID
        let tab_number = self.tabs.len() + 1;
        self.tabs.push(Tab::new(id, tab_number));

        // Always switch to the new tab
        self.active_tab_id = Some(id);
        self.sync_strip();

        log::info!("Created new tab {} (total: {})", id, self.tabs.len());
        id
    }

    /// Close a tab by ID.
    ///
    /// A live session is closed before the tab is removed. Closing an
    /// unknown ID is a no-op returning `None`.
    pub fn close_tab(&mut self, id: TabId) -> Option<ClosedTab> {
        let idx = self.tabs.iter().position(|t| t.id == id)?;
        log::info!("Closing tab {} (index {})", id, idx);

        let closed_session = self.tabs[idx]
            .controller
            .detach_session()
            .map(|mut session| {
                session.close();
                session.id
            });

        self.tabs.remove(idx);

        // If we closed the active tab, switch to another
        if self.active_tab_id == Some(id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                // Prefer the tab at the same index (or previous if at end)
                let new_idx = idx.min(self.tabs.len().saturating_sub(1));
                Some(self.tabs[new_idx].id)
            };
        }

        self.renumber_default_tabs();
        self.sync_strip();

        Some(ClosedTab { id, closed_session })
    }

    /// Close every session and remove every tab, in order.
    ///
    /// This is the silent bulk variant: it never creates replacement tabs.
    pub fn clear_all(&mut self) -> Vec<ClosedTab> {
        let closed: Vec<ClosedTab> = self
            .tabs
            .iter_mut()
            .map(|tab| ClosedTab {
                id: tab.id,
                closed_session: tab.controller.detach_session().map(|mut session| {
                    session.close();
                    session.id
                }),
            })
            .collect();

        self.tabs.clear();
        self.active_tab_id = None;
        self.sync_strip();

        if !closed.is_empty() {
            log::info!("Cleared {} tabs", closed.len());
        }
        closed
    }

    /// Renumber tabs that have default titles based on their current position
    fn renumber_default_tabs(&mut self) {
        for (idx, tab) in self.tabs.iter_mut().enumerate() {
            tab.set_default_title(idx + 1);
        }
    }

    /// Re-render the presented tab strip from the logical order
    fn sync_strip(&mut self) {
        self.strip.clear();
        self.strip.extend(self.tabs.iter().map(|t| t.id));
    }

    /// Get a reference to the active tab
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .and_then(|id| self.tabs.iter().find(|t| t.id == id))
    }

    /// Switch to a tab by ID. Unknown IDs are ignored.
    pub fn switch_to(&mut self, id: TabId) -> bool {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active_tab_id = Some(id);
            log::debug!("Switched to tab {}", id);
            true
        } else {
            false
        }
    }

    /// Switch to the next tab (wraps around)
    pub fn next_tab(&mut self) {
        self.step_active(1);
    }

    /// Switch to the previous tab (wraps around)
    pub fn prev_tab(&mut self) {
        self.step_active(-1);
    }

    fn step_active(&mut self, direction: isize) {
        if self.tabs.len() <= 1 {
            return;
        }
        let Some(current_idx) = self.active_tab_index() else {
            return;
        };
        let len = self.tabs.len() as isize;
        let next_idx = (current_idx as isize + direction).rem_euclid(len) as usize;
        let next_id = self.tabs[next_idx].id;
        self.switch_to(next_id);
    }

    /// Switch to tab by index (1-based)
    pub fn switch_to_index(&mut self, index: usize) {
        if index > 0 && index <= self.tabs.len() {
            let id = self.tabs[index - 1].id;
            self.switch_to(id);
        }
    }

    /// Move a tab one slot left (-1) or right (1), wrapping at the ends
    pub fn move_tab(&mut self, id: TabId, direction: i32) -> bool {
        let Some(current_idx) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };
        let new_idx = if direction < 0 {
            if current_idx == 0 {
                self.tabs.len() - 1
            } else {
                current_idx - 1
            }
        } else if current_idx >= self.tabs.len() - 1 {
            0
        } else {
            current_idx + 1
        };

        if new_idx == current_idx {
            return false;
        }
        let tab = self.tabs.remove(current_idx);
        self.tabs.insert(new_idx, tab);
        log::debug!("Moved tab {} from index {} to {}", id, current_idx, new_idx);
        self.renumber_default_tabs();
        self.sync_strip();
        true
    }

    /// Move active tab left
    pub fn move_active_tab_left(&mut self) -> bool {
        self.active_tab_id.is_some_and(|id| self.move_tab(id, -1))
    }

    /// Move active tab right
    pub fn move_active_tab_right(&mut self) -> bool {
        self.active_tab_id.is_some_and(|id| self.move_tab(id, 1))
    }

    /// Drag `source` onto `destination`; see [`super::reorder`] for the rule.
    pub fn reorder(&mut self, source: TabId, destination: TabId) -> bool {
        if !reorder(&mut self.tabs, |t| t.id, source, destination) {
            return false;
        }
        log::debug!("Reordered tab {} onto tab {}", source, destination);
        self.renumber_default_tabs();
        self.sync_strip();
        true
    }

    /// Get the number of tabs
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Get the active tab ID
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    /// Get index of active tab (0-based)
    pub fn active_tab_index(&self) -> Option<usize> {
        self.active_tab_id
            .and_then(|id| self.tabs.iter().position(|t| t.id == id))
    }

    /// Get all tabs as a slice, in logical order
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Tab IDs in logical order
    pub fn logical_order(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    /// Tab IDs in presented order
    pub fn presentation_order(&self) -> &[TabId] {
        &self.strip
    }

    /// Get a tab by ID
    pub fn get_tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a tab by ID
    pub fn get_tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}
