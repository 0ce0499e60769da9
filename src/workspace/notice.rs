//! Presentation feed.
//!
//! The workspace records what changed as [`Notice`] values; a presentation
//! layer drains them with [`super::Workspace::take_notices`] and re-renders.

use crate::connectivity::Overlay;
use crate::modal_arbiter::PromptView;
use crate::session::{SessionId, SessionPhase};
use crate::tab::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    TabCreated(TabId),
    TabClosed(TabId),
    TabActivated(TabId),
    /// New presentation order of the tab strip
    TabsReordered(Vec<TabId>),
    /// Silent bulk teardown removed this many tabs
    TabsCleared(usize),
    TabLabelChanged {
        tab: TabId,
        label: String,
    },
    OverlayChanged(Overlay),
    /// Workspace controls became available
    ControlsWired,
    PickerUpdated(TabId),
    PromptOpened(PromptView),
    PromptClosed,
    SessionPhaseChanged {
        tab: TabId,
        phase: SessionPhase,
    },
    /// Latest progress message of a connecting session
    SessionProgress {
        tab: TabId,
        message: String,
    },
    SessionClosed {
        tab: TabId,
        session: SessionId,
    },
    /// Workspace title, e.g. after a network map update
    TitleChanged(String),
}
