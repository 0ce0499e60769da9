//! Boundary with the overlay-network node.
//!
//! The node itself (connection establishment, encryption, routing) is an
//! external collaborator. This module defines what the workspace needs from
//! it: a builder that may fail, a `run` entry point that receives a
//! [`NodeNotifier`], and the `login` / `logout` triggers.

use crate::workspace::WorkspaceEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Authoritative status of the overlay-network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectivityState {
    #[default]
    Uninitialized,
    NeedsLogin,
    NeedsDeviceAuth,
    Stopped,
    Starting,
    Running,
    InUseElsewhere,
}

impl ConnectivityState {
    /// States in which the node is waiting for the user to authenticate.
    pub fn requires_login(self) -> bool {
        matches!(self, Self::NeedsLogin | Self::NeedsDeviceAuth)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "Uninitialized",
            Self::NeedsLogin => "NeedsLogin",
            Self::NeedsDeviceAuth => "NeedsDeviceAuth",
            Self::Stopped => "Stopped",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::InUseElsewhere => "InUseElsewhere",
        };
        f.write_str(name)
    }
}

/// Summary of the node's network map, used for the workspace title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMapSummary {
    /// Name of this node on the overlay network
    pub self_name: String,
    /// Number of peers visible to this node
    pub peer_count: usize,
}

/// Notifications delivered by the node, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeNotification {
    State(ConnectivityState),
    AuthUrl(String),
    NetworkMap(NetworkMapSummary),
    Panic(String),
}

/// Handler bundle given to [`OverlayNode::run`].
///
/// Every call only enqueues a message for the workspace event loop, so the
/// node may call these from inside its own dispatch without re-entering the
/// workspace.
#[derive(Clone)]
pub struct NodeNotifier {
    tx: mpsc::UnboundedSender<WorkspaceEvent>,
}

impl NodeNotifier {
    pub(crate) fn new(tx: mpsc::UnboundedSender<WorkspaceEvent>) -> Self {
        Self { tx }
    }

    pub fn notify_state(&self, state: ConnectivityState) {
        self.send(NodeNotification::State(state));
    }

    pub fn notify_auth_url(&self, url: impl Into<String>) {
        self.send(NodeNotification::AuthUrl(url.into()));
    }

    pub fn notify_network_map(&self, summary: NetworkMapSummary) {
        self.send(NodeNotification::NetworkMap(summary));
    }

    /// Report an unrecoverable node failure. Also used as the fatal-error
    /// handler handed to [`NodeBuilder::build`].
    pub fn notify_panic(&self, error: impl fmt::Display) {
        self.send(NodeNotification::Panic(error.to_string()));
    }

    fn send(&self, notification: NodeNotification) {
        if self.tx.send(WorkspaceEvent::Node(notification)).is_err() {
            log::debug!("Dropping node notification: workspace is gone");
        }
    }
}

/// A running overlay-network node.
pub trait OverlayNode: Send + Sync {
    /// Start the node. Notifications flow through `notifier` until the node
    /// is dropped.
    fn run(&self, notifier: NodeNotifier);

    /// Begin the interactive login flow.
    fn login(&self);

    /// Log out; the node reports the resulting state through its notifier.
    fn logout(&self);
}

/// Constructs the overlay-network node. Construction failure is fatal.
pub trait NodeBuilder {
    fn build(
        &self,
        storage: NodeStateStore,
        on_fatal: NodeNotifier,
    ) -> anyhow::Result<Arc<dyn OverlayNode>>;
}

/// Opaque state blobs the node persists between runs, scoped to one
/// workspace session.
#[derive(Clone)]
pub struct NodeStateStore {
    scope: String,
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl NodeStateStore {
    /// Create an empty store with a fresh session scope.
    pub fn new() -> Self {
        Self {
            scope: uuid::Uuid::new_v4().to_string(),
            blobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(&self.scoped(key)).cloned()
    }

    pub fn set(&self, key: &str, value: Vec<u8>) {
        self.blobs.lock().insert(self.scoped(key), value);
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}/{}", self.scope, key)
    }
}

impl Default for NodeStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_states() {
        assert!(ConnectivityState::NeedsLogin.requires_login());
        assert!(ConnectivityState::NeedsDeviceAuth.requires_login());
        assert!(!ConnectivityState::Stopped.requires_login());
    }

    #[test]
    fn state_store_is_shared_between_clones_but_scoped() {
        let store = NodeStateStore::new();
        let clone = store.clone();
        store.set("profile", b"abc".to_vec());
        assert_eq!(clone.get("profile"), Some(b"abc".to_vec()));

        let other = NodeStateStore::new();
        assert_ne!(other.scope(), store.scope());
        assert_eq!(other.get("profile"), None);
    }
}
