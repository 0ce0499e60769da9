//! Per-tab device picker.
//!
//! The picker is a pure mapping from a device list and a filter string to
//! card view-models ([`view_model`]); rendering lives in [`render`]. Loading
//! is driven by the workspace, which runs the directory fetch off the event
//! loop and hands the result back through [`Picker::finish_load`].

pub mod render;

use meshterm_directory::{Device, DirectoryError};
use std::cmp::Ordering;
use std::fmt;

/// Why a device's connect button is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    Offline,
    RemoteShellDisabled,
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => write!(f, "Device is offline"),
            Self::RemoteShellDisabled => write!(f, "SSH is not enabled on this device"),
        }
    }
}

/// State of a card's connect affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectAffordance {
    Enabled,
    Disabled(DisabledReason),
}

impl ConnectAffordance {
    pub fn for_device(device: &Device) -> Self {
        if !device.online {
            Self::Disabled(DisabledReason::Offline)
        } else if !device.ssh_enabled {
            Self::Disabled(DisabledReason::RemoteShellDisabled)
        } else {
            Self::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// View-model for one device card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCard {
    pub device: Device,
    pub connect: ConnectAffordance,
}

/// Fixed total order: remote shell enabled first, then online first, then
/// case-insensitive name.
pub fn compare_devices(a: &Device, b: &Device) -> Ordering {
    b.ssh_enabled
        .cmp(&a.ssh_enabled)
        .then_with(|| b.online.cmp(&a.online))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort devices in picker order.
pub fn sort_devices(devices: &mut [Device]) {
    devices.sort_by(compare_devices);
}

/// Case-insensitive substring match against name, OS and every address.
/// An empty (or blank) query matches everything.
pub fn matches_filter(device: &Device, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    device.name.to_lowercase().contains(&query)
        || device.os.to_lowercase().contains(&query)
        || device
            .addresses
            .iter()
            .any(|addr| addr.to_lowercase().contains(&query))
}

/// Map a device list and filter to ordered cards. Unnamed devices are
/// excluded.
pub fn view_model(devices: &[Device], query: &str) -> Vec<DeviceCard> {
    let mut visible: Vec<Device> = devices
        .iter()
        .filter(|d| !d.name.trim().is_empty())
        .filter(|d| matches_filter(d, query))
        .cloned()
        .collect();
    sort_devices(&mut visible);
    visible
        .into_iter()
        .map(|device| DeviceCard {
            connect: ConnectAffordance::for_device(&device),
            device,
        })
        .collect()
}

/// Load state of a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerState {
    Loading,
    Ready(Vec<Device>),
    Failed(String),
}

/// Picker attached to every tab.
#[derive(Debug, Clone)]
pub struct Picker {
    state: PickerState,
    query: String,
    /// Generation of the most recent load; stale results are ignored
    load: u64,
    /// Inline message left by the last session on this tab
    session_message: Option<String>,
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker {
    pub fn new() -> Self {
        Self {
            state: PickerState::Loading,
            query: String::new(),
            load: 0,
            session_message: None,
        }
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Start a new load and return its generation.
    pub fn begin_load(&mut self) -> u64 {
        self.load += 1;
        self.state = PickerState::Loading;
        self.load
    }

    /// Apply a fetch result. Returns `false` if a newer load superseded it.
    pub fn finish_load(&mut self, load: u64, result: Result<Vec<Device>, DirectoryError>) -> bool {
        if load != self.load {
            return false;
        }
        self.state = match result {
            Ok(mut devices) => {
                devices.retain(|d| !d.name.trim().is_empty());
                sort_devices(&mut devices);
                PickerState::Ready(devices)
            }
            Err(e) => PickerState::Failed(e.to_string()),
        };
        true
    }

    /// Cards for the current device list and filter. Empty unless loaded.
    pub fn cards(&self) -> Vec<DeviceCard> {
        match &self.state {
            PickerState::Ready(devices) => view_model(devices, &self.query),
            PickerState::Loading | PickerState::Failed(_) => Vec::new(),
        }
    }

    /// Look up a loaded device by name.
    pub fn device(&self, name: &str) -> Option<&Device> {
        match &self.state {
            PickerState::Ready(devices) => devices.iter().find(|d| d.name == name),
            _ => None,
        }
    }

    pub fn session_message(&self) -> Option<&str> {
        self.session_message.as_deref()
    }

    pub fn set_session_message(&mut self, message: Option<String>) {
        self.session_message = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, ssh: bool, online: bool) -> Device {
        Device {
            id: name.to_string(),
            name: name.to_string(),
            display_name: name.split('.').next().unwrap_or(name).to_string(),
            addresses: vec!["100.64.0.1".to_string(), "fd7a:115c::1".to_string()],
            os: "linux".to_string(),
            online,
            ssh_enabled: ssh,
            last_seen: None,
        }
    }

    #[test]
    fn ordering_is_ssh_then_online_then_name() {
        let cards = view_model(
            &[
                device("Zeta.ts.net", true, true),
                device("alpha.ts.net", false, true),
                device("beta.ts.net", true, false),
                device("gamma.ts.net", true, true),
                device("delta.ts.net", false, false),
            ],
            "",
        );
        let names: Vec<&str> = cards.iter().map(|c| c.device.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "gamma.ts.net",
                "Zeta.ts.net",
                "beta.ts.net",
                "alpha.ts.net",
                "delta.ts.net"
            ]
        );
    }

    #[test]
    fn filter_matches_name_os_and_addresses() {
        let mut win = device("desk.ts.net", true, true);
        win.os = "Windows".to_string();
        win.addresses = vec!["100.101.5.9".to_string()];
        let devices = vec![device("web.ts.net", true, true), win];

        assert_eq!(view_model(&devices, "WINDOWS").len(), 1);
        assert_eq!(view_model(&devices, "101.5").len(), 1);
        assert_eq!(view_model(&devices, "web").len(), 1);
        assert_eq!(view_model(&devices, "fd7a").len(), 1);
        assert_eq!(view_model(&devices, "  ").len(), 2);
        assert!(view_model(&devices, "nomatch").is_empty());
    }

    #[test]
    fn filter_ignores_display_name() {
        let mut db = device("db-7.ts.net", true, true);
        db.display_name = "Accounting Server".to_string();

        assert!(!matches_filter(&db, "accounting"));
        assert!(matches_filter(&db, "db-7"));
    }

    #[test]
    fn connect_affordance_reasons() {
        assert_eq!(
            ConnectAffordance::for_device(&device("a", true, true)),
            ConnectAffordance::Enabled
        );
        assert_eq!(
            ConnectAffordance::for_device(&device("a", true, false)),
            ConnectAffordance::Disabled(DisabledReason::Offline)
        );
        assert_eq!(
            ConnectAffordance::for_device(&device("a", false, true)),
            ConnectAffordance::Disabled(DisabledReason::RemoteShellDisabled)
        );
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut picker = Picker::new();
        let first = picker.begin_load();
        let second = picker.begin_load();

        assert!(!picker.finish_load(first, Ok(vec![device("old", true, true)])));
        assert_eq!(picker.state(), &PickerState::Loading);

        assert!(picker.finish_load(second, Err(DirectoryError::Network("down".into()))));
        assert_eq!(
            picker.state(),
            &PickerState::Failed("network error: down".to_string())
        );
        assert!(picker.cards().is_empty());
    }
}
