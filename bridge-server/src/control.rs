//! Control-plane dispatcher.
//!
//! Maps `(method, path, body)` onto [`HueState`] operations and renders the
//! bridge's JSON payloads. Every API reply is HTTP 200, success or not; only
//! paths with no handler at all get a bare 404.
//!
//! ```text
//! POST   /api                              create user
//! POST   /api/<user>/lights                search for new lights
//! GET    /api/<user>/lights/new            commit + report found lights
//! GET    /api/<user>/lights[/<id>]
//! PUT    /api/<user>/lights/<id>           rename
//! PUT    /api/<user>/lights/<id>/state     partial state update
//! DELETE /api/<user>/lights/<id>
//! POST   /api/<user>/groups                GET/PUT/DELETE /groups/<id>, PUT /groups/<id>/action
//! POST   /api/<user>/scenes                GET/PUT/DELETE /scenes/<id>
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use hue_state::{Group, GroupUpdate, HueState, LightId, NewGroup, Scene, SceneUpdate, StateError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use warp::http::{Method, StatusCode};

use crate::error::Result;
use crate::response::{self, ErrorType};

/// The only username of the demo profile.
pub const DEMO_USERNAME: &str = "foo";

/// Which routes a bridge serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Pairing with random usernames plus all light, group and scene routes
    #[default]
    Full,
    /// Fixed `foo` user and the light list/get/state routes only
    Demo,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Profile::Full),
            "demo" => Ok(Profile::Demo),
            other => Err(format!("unknown profile '{other}', expected 'full' or 'demo'")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Full => f.write_str("full"),
            Profile::Demo => f.write_str("demo"),
        }
    }
}

/// Status and optional JSON body produced by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: Option<Value>,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    SearchLights,
    NewLights,
    Lights,
    Light(&'a str),
    RenameLight(&'a str),
    LightState(&'a str),
    DeleteLight(&'a str),
    CreateGroup,
    Groups,
    Group(&'a str),
    UpdateGroup(&'a str),
    GroupAction(&'a str),
    DeleteGroup(&'a str),
    CreateScene,
    Scenes,
    Scene(&'a str),
    UpdateScene(&'a str),
    DeleteScene(&'a str),
}

impl<'a> Route<'a> {
    /// Resolve the path below `/api/<user>`.
    fn resolve(method: &Method, segments: &[&'a str]) -> Option<Self> {
        let get = *method == Method::GET;
        let put = *method == Method::PUT;
        let post = *method == Method::POST;
        let delete = *method == Method::DELETE;

        let route = match *segments {
            ["lights"] if post => Route::SearchLights,
            ["lights"] if get => Route::Lights,
            ["lights", "new"] if get => Route::NewLights,
            ["lights", id] if get => Route::Light(id),
            ["lights", id] if put => Route::RenameLight(id),
            ["lights", id] if delete => Route::DeleteLight(id),
            ["lights", id, "state"] if put => Route::LightState(id),
            ["groups"] if post => Route::CreateGroup,
            ["groups"] if get => Route::Groups,
            ["groups", id] if get => Route::Group(id),
            ["groups", id] if put => Route::UpdateGroup(id),
            ["groups", id] if delete => Route::DeleteGroup(id),
            ["groups", id, "action"] if put => Route::GroupAction(id),
            ["scenes"] if post => Route::CreateScene,
            ["scenes"] if get => Route::Scenes,
            ["scenes", id] if get => Route::Scene(id),
            ["scenes", id] if put => Route::UpdateScene(id),
            ["scenes", id] if delete => Route::DeleteScene(id),
            _ => return None,
        };
        Some(route)
    }

    fn served_by(&self, profile: Profile) -> bool {
        match profile {
            Profile::Full => true,
            Profile::Demo => matches!(self, Route::Lights | Route::Light(_) | Route::LightState(_)),
        }
    }
}

/// Request-response state machine of the bridge API.
///
/// Stateless across requests: every `/api/<user>/...` call re-checks the
/// user against the whitelist.
pub struct ControlPlane {
    state: Arc<HueState>,
    profile: Profile,
    trace_requests: bool,
}

impl ControlPlane {
    /// Create a dispatcher over `state`.
    ///
    /// The demo profile whitelists [`DEMO_USERNAME`].
    pub fn new(state: Arc<HueState>, profile: Profile) -> Result<Self> {
        if profile == Profile::Demo {
            state.whitelist().add_user(DEMO_USERNAME)?;
        }

        Ok(Self {
            state,
            profile,
            trace_requests: false,
        })
    }

    /// Log state change bodies at info level instead of debug.
    pub fn with_trace_requests(mut self, trace_requests: bool) -> Self {
        self.trace_requests = trace_requests;
        self
    }

    pub fn state(&self) -> &Arc<HueState> {
        &self.state
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Handle one request. `body` may be empty or not JSON at all.
    pub async fn dispatch(&self, method: &Method, path: &str, body: &[u8]) -> Reply {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["api"] if *method == Method::POST => self.create_user(parse_body(body)).await,
            ["api", user, rest @ ..] => {
                let Some(route) = Route::resolve(method, rest).filter(|r| r.served_by(self.profile))
                else {
                    return Reply::not_found();
                };
                if !self.state.whitelist().check_user(user) {
                    return Reply::json(response::error(ErrorType::UnauthorizedUser, "/"));
                }
                self.handle(route, parse_body(body)).await
            }
            _ => Reply::not_found(),
        }
    }

    async fn handle(&self, route: Route<'_>, body: Option<Value>) -> Reply {
        match route {
            Route::SearchLights => self.search_lights(),
            Route::NewLights => self.new_lights().await,
            Route::Lights => serialized("/lights", &self.state.lights().all()),
            Route::Light(id) => self.get_light(id),
            Route::RenameLight(id) => self.rename_light(id, body).await,
            Route::LightState(id) => self.set_light_state(id, body).await,
            Route::DeleteLight(id) => self.delete_light(id).await,
            Route::CreateGroup => self.create_group(body).await,
            Route::Groups => serialized("/groups", &self.state.groups().all()),
            Route::Group(id) => match self.state.groups().get(id) {
                Some(group) => serialized(&format!("/groups/{id}"), &group),
                None => missing(&format!("/groups/{id}")),
            },
            Route::UpdateGroup(id) => self.update_group(id, body).await,
            Route::GroupAction(id) => self.set_group_action(id, body).await,
            Route::DeleteGroup(id) => {
                let address = format!("/groups/{id}");
                match self.state.groups().remove(id) {
                    Ok(_) => self.persisted(&address, response::success(&format!("{address} deleted"))).await,
                    Err(e) => failure(&address, e),
                }
            }
            Route::CreateScene => self.create_scene(body).await,
            Route::Scenes => serialized("/scenes", &self.state.scenes().all()),
            Route::Scene(id) => match self.state.scenes().get(id) {
                Some(scene) => serialized(&format!("/scenes/{id}"), &scene),
                None => missing(&format!("/scenes/{id}")),
            },
            Route::UpdateScene(id) => self.update_scene(id, body).await,
            Route::DeleteScene(id) => {
                let address = format!("/scenes/{id}");
                match self.state.scenes().remove(id) {
                    Ok(_) => self.persisted(&address, response::success(&format!("{address} deleted"))).await,
                    Err(e) => failure(&address, e),
                }
            }
        }
    }

    // ========================================================================
    // Pairing
    // ========================================================================

    async fn create_user(&self, body: Option<Value>) -> Reply {
        if self.profile == Profile::Demo {
            return Reply::json(response::success_structure("username", DEMO_USERNAME));
        }

        let has_devicetype = body
            .as_ref()
            .and_then(|body| body.get("devicetype"))
            .is_some_and(is_truthy);
        if !has_devicetype {
            return missing("/");
        }

        match self.state.whitelist().create_user() {
            Ok(username) => {
                self.persisted("/", response::success_structure("username", username))
                    .await
            }
            Err(e) => failure("/", e),
        }
    }

    // ========================================================================
    // Lights
    // ========================================================================

    fn search_lights(&self) -> Reply {
        match self.state.search_new_lights() {
            Ok(()) => Reply::json(response::success_structure(
                "/lights",
                "Searching for new devices",
            )),
            Err(e) => failure("/lights", e),
        }
    }

    async fn new_lights(&self) -> Reply {
        let result = match self.state.new_lights() {
            Ok(result) => result,
            Err(e) => return failure("/lights/new", e),
        };

        let mut payload = Map::new();
        if let Some((id, name)) = &result.found {
            payload.insert(id.to_string(), json!({ "name": name }));
        }
        payload.insert("lastscan".to_string(), Value::String(result.lastscan));

        // A failed flush still leaves the committed light listed under /lights.
        if result.found.is_some() {
            self.persisted("/lights/new", Value::Object(payload)).await
        } else {
            Reply::json(Value::Object(payload))
        }
    }

    fn get_light(&self, id: &str) -> Reply {
        let address = format!("/lights/{id}");
        match parse_light_id(id).and_then(|id| self.state.lights().get(id)) {
            Some(light) => serialized(&address, &light),
            None => missing(&address),
        }
    }

    async fn rename_light(&self, id: &str, body: Option<Value>) -> Reply {
        let address = format!("/lights/{id}");
        let name = body
            .as_ref()
            .and_then(|body| body.get("name"))
            .and_then(Value::as_str);
        let (Some(light_id), Some(name)) = (parse_light_id(id), name) else {
            return missing(&address);
        };

        match self.state.lights().rename(light_id, name) {
            Ok(()) => {
                let payload = response::success_structure(&format!("{address}/name"), name);
                self.persisted(&address, payload).await
            }
            Err(e) => failure(&address, e),
        }
    }

    async fn set_light_state(&self, id: &str, body: Option<Value>) -> Reply {
        let address = format!("/lights/{id}");
        let (Some(light_id), Some(attributes)) =
            (parse_light_id(id), body.as_ref().and_then(Value::as_object))
        else {
            return missing(&address);
        };

        if self.trace_requests {
            let body = serde_json::Value::Object(attributes.clone());
            tracing::info!(light = light_id, "Received state change {}", body);
        } else {
            tracing::debug!(light = light_id, "Received state change");
        }

        match self.state.lights().apply_state_update(light_id, attributes) {
            Ok(updates) => {
                let payload = updates
                    .into_iter()
                    .map(|update| response::success_entry(&update.address, update.value))
                    .collect();
                self.persisted(&address, Value::Array(payload)).await
            }
            Err(e) => failure(&address, e),
        }
    }

    async fn delete_light(&self, id: &str) -> Reply {
        let address = format!("/lights/{id}");
        let Some(light_id) = parse_light_id(id) else {
            return missing(&address);
        };

        match self.state.lights().remove(light_id) {
            Ok(_) => {
                self.persisted(&address, response::success(&format!("{address} deleted")))
                    .await
            }
            Err(e) => failure(&address, e),
        }
    }

    // ========================================================================
    // Groups
    // ========================================================================

    async fn create_group(&self, body: Option<Value>) -> Reply {
        let Some(request) = parse_request::<NewGroup>(body) else {
            return missing("/groups");
        };

        match self.state.groups().create(Group::from(request)) {
            Ok(id) => {
                self.persisted("/groups/", response::success_structure("id", id))
                    .await
            }
            Err(e) => failure("/groups/", e),
        }
    }

    async fn update_group(&self, id: &str, body: Option<Value>) -> Reply {
        let address = format!("/groups/{id}");
        let Some(update) = parse_request::<GroupUpdate>(body) else {
            return missing(&address);
        };

        match self.state.groups().update(id, update) {
            Ok(group) => {
                let payload = response::success_structure(&address, group.name);
                self.persisted(&address, payload).await
            }
            Err(e) => failure(&address, e),
        }
    }

    async fn set_group_action(&self, id: &str, body: Option<Value>) -> Reply {
        let address = format!("/groups/{id}");
        let Some(attributes) = body.as_ref().and_then(Value::as_object) else {
            return missing(&address);
        };

        match self.state.groups().set_action(id, attributes) {
            Ok(updates) => {
                let payload = updates
                    .into_iter()
                    .map(|update| response::success_entry(&update.address, update.value))
                    .collect();
                self.persisted(&address, Value::Array(payload)).await
            }
            Err(e) => failure(&address, e),
        }
    }

    // ========================================================================
    // Scenes
    // ========================================================================

    async fn create_scene(&self, body: Option<Value>) -> Reply {
        let Some(scene) = parse_request::<Scene>(body) else {
            return missing("/scenes");
        };

        match self.state.scenes().create(scene) {
            Ok(id) => {
                self.persisted("/scenes/", response::success_structure("id", id))
                    .await
            }
            Err(e) => failure("/scenes/", e),
        }
    }

    async fn update_scene(&self, id: &str, body: Option<Value>) -> Reply {
        let address = format!("/scenes/{id}");
        let Some(update) = parse_request::<SceneUpdate>(body) else {
            return missing(&address);
        };

        match self.state.scenes().update(id, update) {
            Ok(scene) => {
                let name = scene.name.map_or(Value::Null, Value::String);
                self.persisted(&address, response::success_structure(&address, name))
                    .await
            }
            Err(e) => failure(&address, e),
        }
    }

    /// Flush the store, replying with `payload` on success and an internal
    /// error at `address` otherwise. The in-memory change stays either way.
    async fn persisted(&self, address: &str, payload: Value) -> Reply {
        match self.state.persist().await {
            Ok(()) => Reply::json(payload),
            Err(e) => {
                tracing::error!(address, error = %e, "Failed to persist bridge state");
                Reply::json(response::error(ErrorType::InternalError, address))
            }
        }
    }
}

impl fmt::Debug for ControlPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlane")
            .field("profile", &self.profile)
            .field("trace_requests", &self.trace_requests)
            .finish()
    }
}

fn missing(address: &str) -> Reply {
    Reply::json(response::error(ErrorType::MissingParameter, address))
}

fn failure(address: &str, error: StateError) -> Reply {
    if error.is_not_found() {
        return missing(address);
    }
    tracing::error!(address, error = %error, "Control plane operation failed");
    Reply::json(response::error(ErrorType::InternalError, address))
}

fn serialized<T: Serialize>(address: &str, value: &T) -> Reply {
    match serde_json::to_value(value) {
        Ok(body) => Reply::json(body),
        Err(e) => {
            tracing::error!(address, error = %e, "Failed to serialize reply");
            Reply::json(response::error(ErrorType::InternalError, address))
        }
    }
}

fn parse_light_id(id: &str) -> Option<LightId> {
    id.parse().ok()
}

/// Parse a request body as JSON. Empty or malformed bodies count as absent.
fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Decode an optional object body, defaulting when there is no body.
fn parse_request<T: DeserializeOwned + Default>(body: Option<Value>) -> Option<T> {
    match body {
        None => Some(T::default()),
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        Some(_) => None,
    }
}

/// Whether a JSON value counts as present in a body check.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
