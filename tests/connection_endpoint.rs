//! Endpoint handling and reply extraction over real sockets.

mod common;

use common::StubHost;
use futures::future::join_all;
use serial_test::serial;
use skyx_remote::skyx_core::{connection, ScriptTransport, TransportSettings};
use skyx_remote::skyx_devices::{Camera, SkyxAction, TargetInformation};
use skyx_remote::{SkyxConnection, SkyxError};
use std::time::Duration;

#[tokio::test]
async fn test_send_returns_text_before_first_pipe() {
    let host = StubHost::start(|_| "Ready".to_string()).await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();

    assert_eq!(conn.send("ccdsoftCamera.Status").await.unwrap(), "Ready");

    let host = StubHost::start(|_| "a|b".to_string()).await;
    conn.reconfigure("127.0.0.1", host.port()).unwrap();
    assert_eq!(conn.send("x").await.unwrap(), "a");
}

#[tokio::test]
async fn test_reconfigure_is_seen_by_existing_wrappers() {
    let first = StubHost::start(|_| "undefined".to_string()).await;
    let second = StubHost::start(|_| "undefined".to_string()).await;

    let conn = SkyxConnection::new("127.0.0.1", first.port()).unwrap();
    let chart = TargetInformation::new(conn.transport());
    let action = SkyxAction::new(conn.transport());

    chart.find("M42").await.unwrap();
    conn.reconfigure("127.0.0.1", second.port()).unwrap();
    chart.find("M31").await.unwrap();
    action.execute("TARGETFIND").await.unwrap();

    assert_eq!(first.scripts(), vec!["sky6StarChart.Find(\"M42\");"]);
    assert_eq!(
        second.scripts(),
        vec![
            "sky6StarChart.Find(\"M31\");",
            "TheSkyXAction.execute(\"TARGETFIND\");",
        ]
    );
}

#[tokio::test]
#[serial]
async fn test_shared_registry_reconfigure() {
    let host = StubHost::start(|script| {
        if script.contains("Imager.Connect();") {
            "Ready".to_string()
        } else {
            "42".to_string()
        }
    })
    .await;

    let shared = connection::get_or_create("127.0.0.1", host.port()).unwrap();
    let moved = connection::reconfigure("127.0.0.1", host.port()).unwrap();
    assert!(shared.same_as(&moved));

    let camera = Camera::connect(shared.transport()).await.unwrap();
    assert_eq!(camera.binning().await.unwrap(), 42);

    let scripts = host.scripts();
    assert_eq!(scripts.len(), 2);
    assert_eq!(scripts[1], "ccdsoftCamera.BinX");
}

#[tokio::test]
async fn test_concurrent_sends_use_separate_sockets() {
    let host = StubHost::start(|script| script.trim_end_matches(';').to_string()).await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();

    let replies = join_all((0..8).map(|i| {
        let conn = conn.clone();
        async move { conn.send(&format!("{i};")).await }
    }))
    .await;

    for (i, reply) in replies.into_iter().enumerate() {
        assert_eq!(reply.unwrap(), i.to_string());
    }
    assert_eq!(host.payloads().len(), 8);
}

#[tokio::test]
async fn test_unreachable_host_is_connection_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let conn = SkyxConnection::new("127.0.0.1", port).unwrap();
    conn.set_settings(TransportSettings::default().with_connect_timeout(Duration::from_secs(2)));

    match conn.send("ccdsoftCamera.Status").await {
        Err(SkyxError::ConnectionFailure { endpoint, .. }) => {
            assert_eq!(endpoint, format!("127.0.0.1:{port}"));
        }
        other => panic!("expected ConnectionFailure, got {other:?}"),
    }
}
