//! Blocking directory client.
//!
//! Callers on an async runtime run [`DeviceDirectory::fetch_devices`] inside
//! `spawn_blocking`; `ureq` is synchronous.

use crate::error::DirectoryError;
use crate::http;
use crate::types::{Device, DeviceRecord};
use serde::Deserialize;
use std::time::Duration;

/// Source of device lists.
///
/// Implementations must be `Send + Sync` so a fetch can run on a blocking
/// worker thread.
pub trait DeviceDirectory: Send + Sync {
    /// Fetch and normalize the current device list. No retry is performed.
    fn fetch_devices(&self) -> Result<Vec<Device>, DirectoryError>;
}

/// HTTP implementation of [`DeviceDirectory`].
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    url: String,
    timeout: Duration,
    max_response_bytes: u64,
}

impl DirectoryClient {
    pub fn new(url: impl Into<String>, timeout: Duration, max_response_bytes: u64) -> Self {
        Self {
            url: url.into(),
            timeout,
            max_response_bytes,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DeviceDirectory for DirectoryClient {
    fn fetch_devices(&self) -> Result<Vec<Device>, DirectoryError> {
        http::validate_directory_url(&self.url)?;
        log::debug!("Fetching devices from {}", self.url);

        let response = http::agent(self.timeout)
            .get(&self.url)
            .header("Accept", "application/json")
            .header("User-Agent", "meshterm")
            .call()
            .map_err(|e| {
                log::warn!("Directory request to {} failed: {}", self.url, e);
                DirectoryError::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        let body_str = body
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_string()
            .map_err(|e| DirectoryError::Network(format!("failed to read response: {}", e)))?;

        if !(200..300).contains(&status) {
            let err = error_from_status(status, &body_str);
            log::warn!("Directory returned HTTP {}: {}", status, err);
            return Err(err);
        }

        let devices = parse_devices(&body_str)?;
        log::info!("Directory returned {} devices", devices.len());
        Ok(devices)
    }
}

/// Accepted response shapes: a bare array or an object wrapping one.
///
/// Entries stay as raw values so one malformed record cannot reject the list.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeviceListBody {
    Bare(Vec<serde_json::Value>),
    Wrapped { devices: Vec<serde_json::Value> },
}

/// Parse a successful directory response body into normalized devices.
///
/// Malformed records and records without an identifying name are dropped.
pub fn parse_devices(body: &str) -> Result<Vec<Device>, DirectoryError> {
    let entries = match serde_json::from_str::<DeviceListBody>(body) {
        Ok(DeviceListBody::Bare(entries)) | Ok(DeviceListBody::Wrapped { devices: entries }) => {
            entries
        }
        Err(e) => return Err(DirectoryError::Parse(e.to_string())),
    };

    let total = entries.len();
    let devices: Vec<Device> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<DeviceRecord>(entry) {
            Ok(record) => Device::from_record(record),
            Err(e) => {
                log::warn!("Skipping malformed directory record: {}", e);
                None
            }
        })
        .collect();
    if devices.len() != total {
        log::debug!(
            "Dropped {} unnamed or malformed directory records",
            total - devices.len()
        );
    }
    Ok(devices)
}

#[derive(Deserialize)]
struct ServiceError {
    message: Option<String>,
    error: Option<String>,
}

/// Build the error for a non-success response, preferring the message the
/// service put in its JSON body.
pub fn error_from_status(status: u16, body: &str) -> DirectoryError {
    let service_message = serde_json::from_str::<ServiceError>(body)
        .ok()
        .and_then(|e| e.message.or(e.error))
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let message = service_message
        .unwrap_or_else(|| format!("Directory request failed with HTTP status {}", status));

    DirectoryError::Http { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let body = r#"[
            {"id":"1","name":"a.ts.net","displayName":"a","addresses":["100.64.0.1"],
             "os":"linux","online":true,"lastSeen":null,"sshEnabled":true},
            {"id":"2","name":"","displayName":"ghost","addresses":[],
             "os":"linux","online":true,"lastSeen":null,"sshEnabled":true}
        ]"#;
        let devices = parse_devices(body).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "a.ts.net");
        assert!(devices[0].ssh_enabled);
    }

    #[test]
    fn null_and_malformed_records_are_skipped() {
        let body = r#"[
            {"id":"1","name":"a.ts.net","displayName":"a","addresses":["100.64.0.1"],
             "os":null,"online":true,"lastSeen":null,"sshEnabled":true},
            {"id":"2","name":null,"displayName":null,"addresses":[],
             "os":null,"online":true,"lastSeen":null,"sshEnabled":true},
            {"id":"3","name":"b.ts.net","lastSeen":"yesterday"},
            "not a record"
        ]"#;
        let devices = parse_devices(body).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "a.ts.net");
        assert_eq!(devices[0].os, "");
    }

    #[test]
    fn parses_wrapped_list_with_timestamp() {
        let body = r#"{"devices":[{"id":"1","name":"b.ts.net","online":false,
            "lastSeen":"2026-01-02T03:04:05Z"}]}"#;
        let devices = parse_devices(body).unwrap();
        assert_eq!(devices.len(), 1);
        assert!(!devices[0].online);
        assert!(devices[0].last_seen.is_some());
    }

    #[test]
    fn rejects_non_list_body() {
        assert!(matches!(
            parse_devices(r#"{"status":"ok"}"#),
            Err(DirectoryError::Parse(_))
        ));
    }

    #[test]
    fn status_error_prefers_service_message() {
        let err = error_from_status(403, r#"{"message":"API key expired"}"#);
        assert_eq!(
            err,
            DirectoryError::Http {
                status: 403,
                message: "API key expired".to_string()
            }
        );
        assert_eq!(err.to_string(), "API key expired");
    }

    #[test]
    fn status_error_falls_back_to_generic_message() {
        let err = error_from_status(502, "<html>bad gateway</html>");
        assert_eq!(
            err.to_string(),
            "Directory request failed with HTTP status 502"
        );
    }

    #[test]
    fn invalid_url_is_reported_before_any_request() {
        let client = DirectoryClient::new("ftp://dir", Duration::from_secs(1), 1024);
        assert!(matches!(
            client.fetch_devices(),
            Err(DirectoryError::InvalidUrl(_))
        ));
    }
}
