//! Device directory client for the meshterm workspace.
//!
//! Fetches the list of connectable devices from an external directory
//! service and normalizes the wire records into [`Device`] values.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{DeviceDirectory, DirectoryClient, error_from_status, parse_devices};
pub use error::DirectoryError;
pub use types::{Device, DeviceRecord};
