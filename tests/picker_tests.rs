//! Device picker scenarios through the workspace.

mod common;

use chrono::{Duration, Utc};
use common::{Harness, device};
use meshterm::picker::render::render_picker;
use meshterm::picker::{ConnectAffordance, DisabledReason, PickerState};
use meshterm_directory::{DirectoryError, parse_devices};

fn card_names(h: &Harness, tab: u64) -> Vec<String> {
    h.workspace
        .tabs()
        .get_tab(tab)
        .unwrap()
        .controller
        .picker()
        .cards()
        .into_iter()
        .map(|c| c.device.name)
        .collect()
}

#[tokio::test]
async fn unnamed_devices_are_excluded_and_ssh_sorts_first() {
    let devices = vec![
        device("b.ts.net", false, true),
        device("", true, true),
        device("a.ts.net", true, true),
    ];
    let h = Harness::connected(devices).await;
    let tab = h.first_tab();

    assert_eq!(card_names(&h, tab), vec!["a.ts.net", "b.ts.net"]);

    let cards = h
        .workspace
        .tabs()
        .get_tab(tab)
        .unwrap()
        .controller
        .picker()
        .cards();
    assert_eq!(cards[0].connect, ConnectAffordance::Enabled);
    assert_eq!(
        cards[1].connect,
        ConnectAffordance::Disabled(DisabledReason::RemoteShellDisabled)
    );
}

#[test]
fn directory_payload_with_unnamed_record_yields_two_devices() {
    let body = r#"[
        {"id": "1", "name": "a.ts.net", "sshEnabled": true, "online": true, "addresses": ["100.64.0.1"]},
        {"id": "2", "name": "b.ts.net", "sshEnabled": false, "online": true, "addresses": []},
        {"id": "3", "name": "", "sshEnabled": true, "online": true, "addresses": ["100.64.0.3"]}
    ]"#;
    let devices = parse_devices(body).unwrap();
    let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a.ts.net", "b.ts.net"]);
}

#[tokio::test]
async fn ordering_is_ssh_then_online_then_name() {
    let devices = vec![
        device("Zeta.ts.net", true, true),
        device("alpha.ts.net", false, true),
        device("beta.ts.net", true, false),
        device("gamma.ts.net", false, false),
        device("Delta.ts.net", true, true),
    ];
    let h = Harness::connected(devices).await;

    assert_eq!(
        card_names(&h, h.first_tab()),
        vec![
            "Delta.ts.net",
            "Zeta.ts.net",
            "beta.ts.net",
            "alpha.ts.net",
            "gamma.ts.net"
        ]
    );
}

#[tokio::test]
async fn filter_matches_name_os_and_addresses() {
    let mut windows = device("desk.ts.net", true, true);
    windows.os = "windows".into();
    windows.addresses = vec!["100.101.5.7".into()];
    let devices = vec![device("web.ts.net", true, true), windows];
    let mut h = Harness::connected(devices).await;
    let tab = h.first_tab();

    h.workspace.set_picker_query(tab, "WIN").unwrap();
    assert_eq!(card_names(&h, tab), vec!["desk.ts.net"]);

    h.workspace.set_picker_query(tab, "101.5").unwrap();
    assert_eq!(card_names(&h, tab), vec!["desk.ts.net"]);

    h.workspace.set_picker_query(tab, "").unwrap();
    assert_eq!(card_names(&h, tab).len(), 2);
}

#[tokio::test]
async fn directory_error_is_local_and_recoverable() {
    let mut h = Harness::connected(vec![device("web.ts.net", true, true)]).await;
    let first = h.first_tab();

    h.directory.set(Err(DirectoryError::Http {
        status: 403,
        message: "token expired".into(),
    }));
    let second = h.workspace.create_tab().unwrap();
    h.workspace.settle().await;

    let failed = h.workspace.tabs().get_tab(second).unwrap().controller.picker();
    assert_eq!(failed.state(), &PickerState::Failed("token expired".into()));
    // The other tab keeps its loaded list
    assert_eq!(card_names(&h, first), vec!["web.ts.net"]);

    h.directory.set(Ok(vec![device("db.ts.net", true, true)]));
    h.workspace.reload_picker(second).unwrap();
    h.workspace.settle().await;
    assert_eq!(card_names(&h, second), vec!["db.ts.net"]);
}

#[tokio::test]
async fn rendered_picker_shows_offline_age() {
    let mut offline = device("nas.ts.net", true, false);
    offline.last_seen = Some(Utc::now() - Duration::hours(3));
    let h = Harness::connected(vec![offline, device("web.ts.net", true, true)]).await;

    let picker = h
        .workspace
        .tabs()
        .get_tab(h.first_tab())
        .unwrap()
        .controller
        .picker();
    let lines = render_picker(picker, Utc::now());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("[connect]"));
    assert!(lines[1].contains("Device is offline, last seen 3h ago"));
}

#[tokio::test]
async fn reload_for_unknown_tab_is_rejected() {
    let mut h = Harness::connected(vec![]).await;
    assert_eq!(
        h.workspace.reload_picker(42),
        Err(meshterm::WorkspaceError::TabNotFound(42))
    );
    let fetches = h.directory.fetches();
    assert_eq!(fetches, 1);
}
