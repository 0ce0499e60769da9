//! Shared integration test helpers for meshterm.
//!
//! Fakes for the three external collaborators of the workspace:
//! - [`FakeNode`] / [`FakeNodeBuilder`]: an overlay node driven by the test
//! - [`FakeDirectory`]: a device directory with a swappable result
//! - [`FakeOpener`]: a session opener with a recording journal
//!
//! Include with `mod common;` at the top of each test file. The
//! `#![allow(dead_code)]` suppresses warnings when only a subset is used.

#![allow(dead_code)]

use meshterm::node::{ConnectivityState, NodeBuilder, NodeNotifier, NodeStateStore, OverlayNode};
use meshterm::session::opener::SessionHandle;
use meshterm::session::{PresentationOptions, SessionCallbacks, SessionOpener, SessionTarget};
use meshterm::tab::TabId;
use meshterm::{SessionError, Workspace, WorkspaceDeps};
use meshterm_config::{Config, LoginNameStore};
use meshterm_directory::{Device, DeviceDirectory, DirectoryError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Overlay node whose notifications are emitted by the test.
#[derive(Default)]
pub struct FakeNode {
    notifier: Mutex<Option<NodeNotifier>>,
    logins: AtomicUsize,
    logouts: AtomicUsize,
}

impl FakeNode {
    fn notifier(&self) -> NodeNotifier {
        self.notifier
            .lock()
            .clone()
            .expect("node has not been started")
    }

    pub fn notify(&self, state: ConnectivityState) {
        self.notifier().notify_state(state);
    }

    pub fn auth_url(&self, url: &str) {
        self.notifier().notify_auth_url(url);
    }

    pub fn panic(&self, message: &str) {
        self.notifier().notify_panic(message);
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl OverlayNode for FakeNode {
    fn run(&self, notifier: NodeNotifier) {
        *self.notifier.lock() = Some(notifier);
    }

    fn login(&self) {
        self.logins.fetch_add(1, Ordering::SeqCst);
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.notify(ConnectivityState::NeedsLogin);
    }
}

pub struct FakeNodeBuilder {
    pub node: Arc<FakeNode>,
    pub fail_with: Option<String>,
}

impl NodeBuilder for FakeNodeBuilder {
    fn build(
        &self,
        _storage: NodeStateStore,
        _on_fatal: NodeNotifier,
    ) -> anyhow::Result<Arc<dyn OverlayNode>> {
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(self.node.clone()),
        }
    }
}

/// Directory returning whatever the test last configured.
pub struct FakeDirectory {
    result: Mutex<Result<Vec<Device>, DirectoryError>>,
    fetches: AtomicUsize,
}

impl FakeDirectory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            result: Mutex::new(Ok(devices)),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, result: Result<Vec<Device>, DirectoryError>) {
        *self.result.lock() = result;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DeviceDirectory for FakeDirectory {
    fn fetch_devices(&self) -> Result<Vec<Device>, DirectoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.result.lock().clone()
    }
}

/// One entry in the opener's journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenerEvent {
    Opened {
        tab: TabId,
        address: String,
        login: String,
    },
    Closed {
        tab: TabId,
    },
}

/// Session opener that records every open and close.
#[derive(Default)]
pub struct FakeOpener {
    journal: Arc<Mutex<Vec<OpenerEvent>>>,
    callbacks: Mutex<Vec<SessionCallbacks>>,
    fail_close: bool,
}

impl FakeOpener {
    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    pub fn journal(&self) -> Vec<OpenerEvent> {
        self.journal.lock().clone()
    }

    pub fn opened(&self) -> usize {
        self.journal()
            .iter()
            .filter(|e| matches!(e, OpenerEvent::Opened { .. }))
            .count()
    }

    pub fn closed(&self) -> usize {
        self.journal()
            .iter()
            .filter(|e| matches!(e, OpenerEvent::Closed { .. }))
            .count()
    }

    /// Callbacks handed to the n-th `open` call.
    pub fn callbacks(&self, n: usize) -> SessionCallbacks {
        self.callbacks.lock()[n].clone()
    }
}

struct FakeHandle {
    tab: TabId,
    journal: Arc<Mutex<Vec<OpenerEvent>>>,
    fail: bool,
}

impl SessionHandle for FakeHandle {
    fn close(&mut self) -> Result<(), SessionError> {
        self.journal.lock().push(OpenerEvent::Closed { tab: self.tab });
        if self.fail {
            Err(SessionError::Close("socket already closed".into()))
        } else {
            Ok(())
        }
    }
}

impl SessionOpener for FakeOpener {
    fn open(
        &self,
        container: TabId,
        target: SessionTarget,
        _node: Arc<dyn OverlayNode>,
        callbacks: SessionCallbacks,
        _options: PresentationOptions,
    ) -> Box<dyn SessionHandle> {
        self.journal.lock().push(OpenerEvent::Opened {
            tab: container,
            address: target.address,
            login: target.login_name,
        });
        self.callbacks.lock().push(callbacks);
        Box::new(FakeHandle {
            tab: container,
            journal: Arc::clone(&self.journal),
            fail: self.fail_close,
        })
    }
}

pub fn device(name: &str, ssh_enabled: bool, online: bool) -> Device {
    Device {
        id: name.to_string(),
        name: name.to_string(),
        display_name: name.split('.').next().unwrap_or(name).to_string(),
        addresses: vec![format!("100.64.0.{}", name.len())],
        os: "linux".to_string(),
        online,
        ssh_enabled,
        last_seen: None,
    }
}

/// A started workspace plus handles on its fakes.
pub struct Harness {
    pub workspace: Workspace,
    pub node: Arc<FakeNode>,
    pub directory: Arc<FakeDirectory>,
    pub opener: Arc<FakeOpener>,
}

impl Harness {
    pub fn new(devices: Vec<Device>) -> Self {
        Self::with(devices, Config::default(), FakeOpener::default())
    }

    pub fn with(devices: Vec<Device>, config: Config, opener: FakeOpener) -> Self {
        Self::build(devices, config, opener, LoginNameStore::in_memory())
    }

    pub fn with_login_names(devices: Vec<Device>, login_names: LoginNameStore) -> Self {
        Self::build(devices, Config::default(), FakeOpener::default(), login_names)
    }

    fn build(
        devices: Vec<Device>,
        config: Config,
        opener: FakeOpener,
        login_names: LoginNameStore,
    ) -> Self {
        let node = Arc::new(FakeNode::default());
        let directory = Arc::new(FakeDirectory::new(devices));
        let opener = Arc::new(opener);
        let mut workspace = Workspace::new(WorkspaceDeps {
            config,
            directory: directory.clone(),
            opener: opener.clone(),
            login_names,
        });
        workspace
            .start(&FakeNodeBuilder {
                node: node.clone(),
                fail_with: None,
            })
            .expect("fake node starts");
        Self {
            workspace,
            node,
            directory,
            opener,
        }
    }

    /// Started and `Running`, with the first tab's picker loaded.
    pub async fn connected(devices: Vec<Device>) -> Self {
        let mut harness = Self::new(devices);
        harness.notify(ConnectivityState::Running).await;
        harness
    }

    /// Emit a state notification and process everything it triggers.
    pub async fn notify(&mut self, state: ConnectivityState) {
        self.node.notify(state);
        self.workspace.settle().await;
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        self.workspace.tabs().logical_order()
    }

    pub fn first_tab(&self) -> TabId {
        self.tab_ids()[0]
    }
}
