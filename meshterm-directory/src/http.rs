//! HTTP client helper with native-tls support.

use crate::error::DirectoryError;
use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Validate that a URL is usable as a directory endpoint.
///
/// Only `http` and `https` are accepted, and the URL must name a host.
pub fn validate_directory_url(url: &str) -> Result<(), DirectoryError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| DirectoryError::InvalidUrl(format!("'{}': {}", url, e)))?;

    match parsed.scheme() {
        "https" | "http" => {}
        scheme => {
            return Err(DirectoryError::InvalidUrl(format!(
                "unsupported scheme '{}' in '{}'",
                scheme, url
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(DirectoryError::InvalidUrl(format!("'{}' has no host", url)));
    }

    Ok(())
}

/// Create an HTTP agent configured with native-tls and a global timeout.
///
/// Non-success statuses are returned as responses rather than errors so the
/// caller can surface the service-provided message.
pub fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
