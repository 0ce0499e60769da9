//! Device types for the directory subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A device record as returned by the directory service.
///
/// Explicit `null` values read the same as missing keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub os: String,
    #[serde(deserialize_with = "null_as_default")]
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub ssh_enabled: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A connectable target, normalized from a [`DeviceRecord`].
///
/// `name` is the device identity and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Directory-assigned identifier
    pub id: String,
    /// Fully qualified device name, e.g. `web-1.tail1234.ts.net`
    pub name: String,
    /// Human-readable name (falls back to the first label of `name`)
    pub display_name: String,
    /// Overlay network addresses
    pub addresses: Vec<String>,
    /// OS tag reported by the device
    pub os: String,
    /// Whether the device is currently reachable
    pub online: bool,
    /// Whether remote shell access is enabled on the device
    pub ssh_enabled: bool,
    /// When the device was last seen, if known
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    /// Normalize a wire record. Records without an identifying name are
    /// dropped because they can be neither rendered nor connected to.
    pub fn from_record(record: DeviceRecord) -> Option<Self> {
        let name = record.name.trim().trim_end_matches('.').to_string();
        if name.is_empty() {
            return None;
        }

        let display_name = match record.display_name.trim() {
            "" => name.split('.').next().unwrap_or(&name).to_string(),
            other => other.to_string(),
        };

        let addresses = record
            .addresses
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        Some(Self {
            id: record.id,
            name,
            display_name,
            addresses,
            os: record.os.trim().to_string(),
            online: record.online,
            ssh_enabled: record.ssh_enabled,
            last_seen: record.last_seen,
        })
    }

    /// Identity used for persisted per-device state.
    pub fn identity(&self) -> &str {
        &self.name
    }

    /// Address a session should be opened against: the first overlay
    /// address, or the device name when none is known.
    pub fn connection_target(&self) -> &str {
        self.addresses.first().map(String::as_str).unwrap_or(&self.name)
    }

    /// Whether a remote shell can be opened right now.
    pub fn is_connectable(&self) -> bool {
        self.online && self.ssh_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DeviceRecord {
        DeviceRecord {
            id: "n1".to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_name_is_dropped() {
        assert!(Device::from_record(record("")).is_none());
        assert!(Device::from_record(record("   ")).is_none());
    }

    #[test]
    fn display_name_falls_back_to_first_label() {
        let device = Device::from_record(record("web-1.tail1234.ts.net.")).unwrap();
        assert_eq!(device.name, "web-1.tail1234.ts.net");
        assert_eq!(device.display_name, "web-1");
    }

    #[test]
    fn null_fields_read_as_missing() {
        let rec: DeviceRecord = serde_json::from_str(
            r#"{"id":null,"name":"c.ts.net","displayName":null,"addresses":null,
                "os":null,"online":null,"sshEnabled":null}"#,
        )
        .unwrap();
        assert_eq!(rec.os, "");
        assert!(rec.addresses.is_empty());

        let device = Device::from_record(rec).unwrap();
        assert_eq!(device.display_name, "c");
        assert!(!device.is_connectable());
    }

    #[test]
    fn connection_target_prefers_first_address() {
        let mut rec = record("db.ts.net");
        rec.addresses = vec![" ".to_string(), "100.64.0.7".to_string()];
        let device = Device::from_record(rec).unwrap();
        assert_eq!(device.connection_target(), "100.64.0.7");

        let bare = Device::from_record(record("db.ts.net")).unwrap();
        assert_eq!(bare.connection_target(), "db.ts.net");
    }
}
