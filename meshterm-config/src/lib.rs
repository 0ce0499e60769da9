//! Configuration system for the meshterm workspace.
//!
//! This crate provides:
//!
//! - [`Config`]: YAML configuration loading, saving and default values
//! - [`LogLevel`]: log verbosity shared with the CLI and log bridge
//! - [`LoginNameStore`]: best-effort persisted login names keyed by device

pub mod config;
pub mod error;
pub mod login_names;

pub use config::{Config, LogLevel};
pub use error::ConfigError;
pub use login_names::LoginNameStore;
