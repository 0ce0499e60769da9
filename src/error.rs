//! Typed error types for the workspace core.
//!
//! Errors are handled at the narrowest component that can still make
//! progress. Only [`ConnectivityError`] is workspace-fatal.

use crate::tab::TabId;
use thiserror::Error;

/// Workspace-fatal connectivity failures. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectivityError {
    /// The overlay-network node could not be constructed.
    #[error("failed to start the network node: {0}")]
    NodeStartup(String),

    /// The node reported a panic.
    #[error("the network node crashed: {0}")]
    Panic(String),

    /// The node stopped after having been running.
    #[error("the network node stopped unexpectedly")]
    UnexpectedStop,
}

/// Rejections of user-driven workspace operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    /// Tabs only exist while the node is running.
    #[error("not connected to the network")]
    NotConnected,

    /// A fatal connectivity error stopped the workspace.
    #[error("workspace halted after a fatal error")]
    Halted,

    /// Workspace controls are wired on the first `Running` state.
    #[error("workspace controls are not available yet")]
    ControlsUnavailable,

    #[error("tab {0} does not exist")]
    TabNotFound(TabId),
}

/// Errors reported by the session-open collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The remote side or transport ended the session with an error.
    #[error("{0}")]
    Remote(String),

    /// Closing the underlying connection failed.
    #[error("failed to close session: {0}")]
    Close(String),
}

/// Credential prompt input problems. Never propagated past the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("a login name is required")]
    EmptyLoginName,

    #[error("no credential prompt is open")]
    NotOpen,
}
