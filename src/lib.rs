// Library exports for testing and for embedding the workspace core
//
// # Concurrency model
//
// The workspace is single-threaded: every state mutation happens inside a
// `&mut Workspace` method while handling one `WorkspaceEvent`. Background
// work (directory fetches, prompt waits, login debounce) runs as tokio tasks
// that only ever post messages back over the workspace channel.
//
//   - `parking_lot::Mutex`    : the only lock in the crate family, used by the global
//                               debug logger and the node state-blob store.
//   - `tokio::sync::mpsc`     : every completion reaches the workspace here.
//   - `tokio::sync::oneshot`  : credential prompt replies.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod connectivity;
pub mod error;
pub mod modal_arbiter;
pub mod node;
pub mod picker;
pub mod session;
pub mod tab;
pub mod workspace;

pub use connectivity::Overlay;
pub use error::{ConnectivityError, PromptError, SessionError, WorkspaceError};
pub use workspace::{Notice, Workspace, WorkspaceCommand, WorkspaceDeps, WorkspaceEvent};
