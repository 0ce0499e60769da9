//! Messages processed by the workspace event loop.

use crate::modal_arbiter::PromptOutcome;
use crate::node::NodeNotification;
use crate::session::{SessionId, SessionUpdate};
use crate::tab::TabId;
use meshterm_directory::{Device, DirectoryError};

/// One asynchronous completion or notification, handled in arrival order.
#[derive(Debug)]
pub enum WorkspaceEvent {
    /// Notification from the overlay node
    Node(NodeNotification),
    /// The debounced login trigger fired
    LoginTriggerDue { generation: u64 },
    /// A picker's directory fetch finished
    PickerLoaded {
        tab: TabId,
        load: u64,
        result: Result<Vec<Device>, DirectoryError>,
    },
    /// A credential prompt was confirmed or cancelled
    PromptResolved {
        tab: TabId,
        request: u64,
        device: Device,
        outcome: PromptOutcome,
    },
    /// Lifecycle report for a session
    Session {
        tab: TabId,
        session: SessionId,
        update: SessionUpdate,
    },
    /// Workspace control invoked by the presentation layer
    Command(WorkspaceCommand),
}

/// Workspace-level controls, available once wired on the first `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceCommand {
    NewTab,
    CloseActiveTab,
    NextTab,
    PrevTab,
    MoveActiveTabLeft,
    MoveActiveTabRight,
    /// 1-based tab index
    SwitchToIndex(usize),
    Logout,
}
