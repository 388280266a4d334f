//! Star chart and object information lookups against a stub host.

mod common;

use common::StubHost;
use skyx_remote::skyx_devices::{Epoch, TargetInformation};
use skyx_remote::{SkyxConnection, SkyxError};

fn orion_nebula(script: &str) -> String {
    if script.contains("\"M42\"") {
        "sk6ObjInfoProp_RA_NOW:83.8221\n\
         sk6ObjInfoProp_DEC_NOW:-5.3911\n\
         sk6ObjInfoProp_AZM:151.2\n\
         sk6ObjInfoProp_ALT:38.7\n\
         sk6ObjInfoProp_RA_RATE_ASPERSEC:0\n\
         sk6ObjInfoProp_DEC_RATE_ASPERSEC:0\n"
            .to_string()
    } else {
        "NOSUCH not found.".to_string()
    }
}

#[tokio::test]
async fn test_resolve_target() {
    let host = StubHost::start(orion_nebula).await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();
    let info = TargetInformation::new(conn.transport());

    let m42 = info.resolve("M42").await.unwrap();
    assert_eq!(m42.len(), 6);
    assert_eq!(m42.get("ra_now"), Some(83.8221));
    assert_eq!(m42.get("dec_now"), Some(-5.3911));
    assert_eq!(m42.get("alt"), Some(38.7));
    assert_eq!(m42.get("dec_rate_aspersec"), Some(0.0));

    let json = serde_json::to_value(&m42).unwrap();
    assert_eq!(json["values"]["azm"], 151.2);
}

#[tokio::test]
async fn test_resolve_unknown_target() {
    let host = StubHost::start(orion_nebula).await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();
    let info = TargetInformation::new(conn.transport());

    assert_eq!(
        info.resolve("NOSUCH").await,
        Err(SkyxError::TargetNotFound("NOSUCH".into()))
    );
}

#[tokio::test]
async fn test_resolve_name_with_pipe_is_not_found() {
    // The host echoes the name in its not-found text; the `|` in it ends the
    // reply before the marker.
    let host = StubHost::start(|_| "A|B not found.".to_string()).await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();
    let info = TargetInformation::new(conn.transport());

    assert_eq!(
        info.resolve("A|B").await,
        Err(SkyxError::TargetNotFound("A|B".into()))
    );
}

#[tokio::test]
async fn test_resolve_undefined_reply_is_not_found() {
    let host = StubHost::start(|_| "undefined".to_string()).await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();
    let info = TargetInformation::new(conn.transport());

    assert_eq!(
        info.resolve("Vega").await,
        Err(SkyxError::TargetNotFound("Vega".into()))
    );
}

#[tokio::test]
async fn test_current_target_coordinates() {
    let host = StubHost::start(|script| {
        if script.contains("Property(56)") {
            "83.6331 -5.375".to_string()
        } else {
            "83.8221 -5.3911".to_string()
        }
    })
    .await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();
    let info = TargetInformation::new(conn.transport());

    assert_eq!(
        info.current_target_ra_dec(Epoch::Now).await.unwrap(),
        (83.8221, -5.3911)
    );
    assert_eq!(
        info.current_target_ra_dec(Epoch::J2000).await.unwrap(),
        (83.6331, -5.375)
    );
}

#[tokio::test]
async fn test_find_rejects_anything_but_undefined() {
    let host = StubHost::start(|script| {
        if script.contains("\"Saturn\"") {
            "undefined".to_string()
        } else {
            "TypeError: Object not found. Error = 250.".to_string()
        }
    })
    .await;
    let conn = SkyxConnection::new("127.0.0.1", host.port()).unwrap();
    let info = TargetInformation::new(conn.transport());

    info.find("Saturn").await.unwrap();
    assert_eq!(
        info.find("Planet X").await,
        Err(SkyxError::TargetNotFound("Planet X".into()))
    );
}
