//! Plain-text rendering of picker cards and picker state.

use super::{ConnectAffordance, DeviceCard, Picker, PickerState};
use chrono::{DateTime, Utc};

/// Human-readable age of a timestamp relative to `now`, e.g. `3h ago`.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(then).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// One line per card: status marker, name, OS, first address, and either
/// the connect hint or the reason it is disabled.
pub fn render_card(card: &DeviceCard, now: DateTime<Utc>) -> String {
    let device = &card.device;
    let marker = if device.online { '●' } else { '○' };
    let address = device.addresses.first().map(String::as_str).unwrap_or("-");
    let os = if device.os.is_empty() { "?" } else { &device.os };

    let status = match card.connect {
        ConnectAffordance::Enabled => "[connect]".to_string(),
        ConnectAffordance::Disabled(reason) => match device.last_seen {
            Some(seen) if !device.online => {
                format!("({}, last seen {})", reason, relative_age(seen, now))
            }
            _ => format!("({})", reason),
        },
    };

    format!(
        "{} {:<24} {:<10} {:<16} {}",
        marker, device.display_name, os, address, status
    )
}

/// Render the whole picker: loading / error text, or the filtered cards.
pub fn render_picker(picker: &Picker, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(message) = picker.session_message() {
        lines.push(format!("! {}", message));
    }
    match picker.state() {
        PickerState::Loading => lines.push("Loading devices...".to_string()),
        PickerState::Failed(error) => lines.push(format!("Failed to load devices: {}", error)),
        PickerState::Ready(_) => {
            let cards = picker.cards();
            if cards.is_empty() {
                lines.push("No devices found.".to_string());
            }
            lines.extend(cards.iter().map(|card| render_card(card, now)));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use meshterm_directory::Device;

    fn offline_device(last_seen: Option<DateTime<Utc>>) -> Device {
        Device {
            id: "1".to_string(),
            name: "nas.ts.net".to_string(),
            display_name: "nas".to_string(),
            addresses: vec!["100.64.0.9".to_string()],
            os: "linux".to_string(),
            online: false,
            ssh_enabled: true,
            last_seen,
        }
    }

    #[test]
    fn relative_age_buckets() {
        let now = Utc::now();
        assert_eq!(relative_age(now - Duration::seconds(5), now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(7), now), "7m ago");
        assert_eq!(relative_age(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_age(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn offline_card_shows_reason_and_age() {
        let now = Utc::now();
        let device = offline_device(Some(now - Duration::hours(5)));
        let card = DeviceCard {
            connect: ConnectAffordance::for_device(&device),
            device,
        };
        let line = render_card(&card, now);
        assert!(line.contains("nas"));
        assert!(line.contains("Device is offline, last seen 5h ago"));
    }

    #[test]
    fn picker_renders_loading_and_failure() {
        let mut picker = Picker::new();
        let now = Utc::now();
        assert_eq!(render_picker(&picker, now), vec!["Loading devices..."]);

        let load = picker.begin_load();
        picker.finish_load(
            load,
            Err(meshterm_directory::DirectoryError::Http {
                status: 401,
                message: "unauthorized".to_string(),
            }),
        );
        assert_eq!(
            render_picker(&picker, now),
            vec!["Failed to load devices: unauthorized"]
        );
    }
}
