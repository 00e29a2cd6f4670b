//! End-to-end tests for the bridge process.
//!
//! Each test starts a full bridge on ephemeral ports bound to 127.0.0.1
//! and talks to it the way a hue app would: SSDP search first, then HTTP.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hue_bridge::{BridgeConfig, ChangeCallback, HueBridge, Profile};
use hue_discovery::probe;
use serde_json::{json, Value};

fn local_config() -> BridgeConfig {
    BridgeConfig::default()
        .with_port(0)
        .with_discovery_port(0)
        .with_advertise_ip(Ipv4Addr::LOCALHOST)
}

async fn pair(client: &reqwest::Client, bridge: &HueBridge) -> String {
    let reply: Value = client
        .post(format!("{}/api", bridge.base_url()))
        .json(&json!({"devicetype": "bridge_tests#runner"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    reply[0]["success"]["username"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_added_light_is_listed_with_default_state() {
    let bridge = HueBridge::start(local_config()).await.unwrap();
    let client = reqwest::Client::new();

    assert_eq!(bridge.add_light("foo", None).unwrap(), 0);
    let user = pair(&client, &bridge).await;

    let lights: Value = client
        .get(format!("{}/api/{user}/lights", bridge.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let lights = lights.as_object().unwrap();
    assert_eq!(lights.len(), 1);
    assert_eq!(lights["0"]["name"], "foo");
    assert_eq!(lights["0"]["state"]["on"], false);

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_state_change_reaches_callback() {
    let bridge = HueBridge::start(local_config()).await.unwrap();
    let client = reqwest::Client::new();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bridge
        .add_light(
            "foo",
            Some(ChangeCallback::from_fn(move |key, value| {
                sink.lock().unwrap().push((key.to_string(), value.clone()));
            })),
        )
        .unwrap();
    let user = pair(&client, &bridge).await;

    let reply: Value = client
        .put(format!("{}/api/{user}/lights/0/state", bridge.base_url()))
        .json(&json!({"on": true, "bri": 100}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        reply,
        json!([
            {"success": {"/lights/0/state/on": true}},
            {"success": {"/lights/0/state/bri": 100}}
        ])
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("on".to_string(), json!(true)), ("bri".to_string(), json!(100))]
    );

    let light = bridge.state().lights().get(0).unwrap();
    assert!(light.state.on());
    assert_eq!(light.state.bri(), Some(100));

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_discovery_points_at_http_port() {
    let bridge = HueBridge::start(local_config()).await.unwrap();
    let target = SocketAddr::from((Ipv4Addr::LOCALHOST, bridge.discovery_addr().port()));

    let responses = probe::probe(target, "ssdp:all", Duration::from_millis(500))
        .await
        .unwrap();

    assert_eq!(responses.len(), 3);
    let location = format!("http://127.0.0.1:{}/description.xml", bridge.port());
    for response in &responses {
        assert_eq!(response.location, location);
        assert_eq!(response.bridge_id.as_deref(), Some(bridge.identity().bridge_id()));
    }

    let xml = reqwest::get(&location).await.unwrap().text().await.unwrap();
    assert!(xml.contains(&format!("<URLBase>http://127.0.0.1:{}/</URLBase>", bridge.port())));

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_json_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hue.json");

    let bridge = HueBridge::start(local_config().with_storage_path(&path))
        .await
        .unwrap();
    let client = reqwest::Client::new();
    bridge.add_light("foo", None).unwrap();
    let user = pair(&client, &bridge).await;
    bridge.shutdown().await;

    let bridge = HueBridge::start(local_config().with_storage_path(&path))
        .await
        .unwrap();
    assert!(bridge.state().whitelist().check_user(&user));
    assert_eq!(bridge.state().lights().get(0).unwrap().name, "foo");
    assert_eq!(bridge.add_light("bar", None).unwrap(), 1);

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_demo_profile_uses_fixed_user() {
    let bridge = HueBridge::start(local_config().with_profile(Profile::Demo))
        .await
        .unwrap();
    bridge.add_light("foo", None).unwrap();

    let light: Value = reqwest::get(format!("{}/api/foo/lights/0", bridge.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(light["name"], "foo");

    bridge.shutdown().await;
}
