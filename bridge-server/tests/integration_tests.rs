//! Integration tests for the bridge server.
//!
//! These tests start a real HTTP server on an ephemeral port, send actual
//! HTTP requests and check the payloads a bridge client would see.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use bridge_server::{BridgeServer, ControlPlane, Profile, ServerConfig};
use hue_discovery::BridgeIdentity;
use hue_state::{ChangeCallback, HueState};
use hue_storage::{KeyValueStore, Memory};
use parking_lot::Mutex;
use serde_json::{json, Value};

async fn start(profile: Profile) -> (BridgeServer, Arc<HueState>) {
    let store = KeyValueStore::open(Memory::new()).await.unwrap();
    let state = Arc::new(HueState::load(store).unwrap());
    let control = ControlPlane::new(Arc::clone(&state), profile).unwrap();
    let config = ServerConfig {
        port: 0,
        advertise_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        identity: BridgeIdentity::default(),
        trace_requests: true,
    };
    let server = BridgeServer::start(config, control)
        .await
        .expect("Failed to start bridge server");
    (server, state)
}

async fn pair(client: &reqwest::Client, base_url: &str) -> String {
    let reply: Value = client
        .post(format!("{base_url}/api"))
        .json(&json!({"devicetype": "integration#test"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    reply[0]["success"]["username"].as_str().unwrap().to_string()
}

/// Pair, add a light, switch it on and read it back.
#[tokio::test]
async fn test_light_control_end_to_end() {
    let (server, state) = start(Profile::Full).await;
    let base_url = server.base_url().to_string();
    let client = reqwest::Client::new();

    let changes = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&changes);
    state
        .lights()
        .add_light(
            "foo",
            Some(ChangeCallback::from_fn(move |key, value| {
                log.lock().push(format!("{key}={value}"));
            })),
        )
        .unwrap();

    let user = pair(&client, &base_url).await;

    let lights: Value = client
        .get(format!("{base_url}/api/{user}/lights"))
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

    let response = client
        .put(format!("{base_url}/api/{user}/lights/0/state"))
        .json(&json!({"on": true, "bri": 100}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(
        reply,
        json!([
            {"success": {"/lights/0/state/on": true}},
            {"success": {"/lights/0/state/bri": 100}}
        ])
    );
    assert_eq!(*changes.lock(), ["on=true", "bri=100"]);

    let light: Value = client
        .get(format!("{base_url}/api/{user}/lights/0"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(light["state"]["on"], true);
    assert_eq!(light["state"]["bri"], 100);

    server.shutdown().await;
}

#[tokio::test]
async fn test_errors_are_payloads_with_status_200() {
    let (server, _state) = start(Profile::Full).await;
    let base_url = server.base_url().to_string();
    let client = reqwest::Client::new();

    let response = client.post(format!("{base_url}/api")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply[0]["error"]["type"], 5);
    assert_eq!(reply[0]["error"]["address"], "/");

    let response = client
        .get(format!("{base_url}/api/stranger/lights"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(
        reply,
        json!([{"error": {"type": 1, "address": "/", "description": "unauthorized user"}}])
    );

    let user = pair(&client, &base_url).await;
    let response = client
        .get(format!("{base_url}/api/{user}/lights/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply[0]["error"]["type"], 5);
    assert_eq!(reply[0]["error"]["address"], "/lights/42");

    let response = client
        .get(format!("{base_url}/api/{user}/sensors"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    server.shutdown().await;
}

#[tokio::test]
async fn test_usernames_are_unique() {
    let (server, state) = start(Profile::Full).await;
    let base_url = server.base_url().to_string();
    let client = reqwest::Client::new();

    let first = pair(&client, &base_url).await;
    let second = pair(&client, &base_url).await;
    assert_ne!(first, second);
    assert!(state.whitelist().check_user(&first));
    assert!(state.whitelist().check_user(&second));

    server.shutdown().await;
}

#[tokio::test]
async fn test_description_document() {
    let (server, _state) = start(Profile::Demo).await;
    let port = server.port();

    let response = reqwest::get(format!("http://127.0.0.1:{port}/description.xml"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/xml");
    let xml = response.text().await.unwrap();
    assert!(xml.contains(&format!("<URLBase>http://127.0.0.1:{port}/</URLBase>")));
    assert!(xml.contains("<serialNumber>0017887ebe7d</serialNumber>"));
    assert!(xml.ends_with("</root>\r\n"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_search_for_new_lights() {
    let (server, state) = start(Profile::Full).await;
    let base_url = server.base_url().to_string();
    let client = reqwest::Client::new();
    let user = pair(&client, &base_url).await;

    let reply: Value = client
        .post(format!("{base_url}/api/{user}/lights"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply, json!([{"success": {"/lights": "Searching for new devices"}}]));

    let found: Value = client
        .get(format!("{base_url}/api/{user}/lights/new"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let name = found["0"]["name"].as_str().unwrap();
    assert_eq!(state.lights().get(0).unwrap().name, name);
    assert!(found["lastscan"].is_string());

    server.shutdown().await;
}

#[tokio::test]
async fn test_demo_profile_serves_fixed_user() {
    let (server, state) = start(Profile::Demo).await;
    let base_url = server.base_url().to_string();
    let client = reqwest::Client::new();
    state.lights().add_light("bar", None).unwrap();

    let reply: Value = client
        .post(format!("{base_url}/api"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply, json!([{"success": {"username": "foo"}}]));

    let light: Value = client
        .get(format!("{base_url}/api/foo/lights/0"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(light["name"], "bar");

    let response = client
        .post(format!("{base_url}/api/foo/groups"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    server.shutdown().await;
}
