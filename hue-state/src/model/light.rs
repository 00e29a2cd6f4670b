//! Light and LightState types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Light identifier, assigned sequentially by the registry
pub type LightId = u32;

/// Attribute record of a light.
///
/// Any key a client sends is stored as-is, so this is a thin wrapper around a
/// JSON object that keeps insertion order. Typed accessors cover the
/// attributes the bridge itself understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightState(Map<String, Value>);

impl LightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Copy every attribute of `attributes` into this state.
    pub fn merge(&mut self, attributes: &Map<String, Value>) {
        for (key, value) in attributes {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// On/off flag, `false` when never set.
    pub fn on(&self) -> bool {
        self.0.get("on").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn bri(&self) -> Option<u64> {
        self.0.get("bri").and_then(Value::as_u64)
    }

    pub fn hue(&self) -> Option<u64> {
        self.0.get("hue").and_then(Value::as_u64)
    }

    pub fn sat(&self) -> Option<u64> {
        self.0.get("sat").and_then(Value::as_u64)
    }

    /// Color temperature in mired
    pub fn ct(&self) -> Option<u64> {
        self.0.get("ct").and_then(Value::as_u64)
    }

    /// CIE xy coordinates
    pub fn xy(&self) -> Option<(f64, f64)> {
        match self.0.get("xy")?.as_array()?.as_slice() {
            [x, y] => Some((x.as_f64()?, y.as_f64()?)),
            _ => None,
        }
    }

    pub fn reachable(&self) -> Option<bool> {
        self.0.get("reachable").and_then(Value::as_bool)
    }

    pub fn colormode(&self) -> Option<&str> {
        self.0.get("colormode").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for LightState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A light as reported by `GET /api/<user>/lights/<id>`.
///
/// Fields the bridge does not interpret (capabilities, config, swupdate,
/// ...) are carried through unchanged in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    #[serde(default)]
    pub state: LightState,
    #[serde(rename = "type")]
    pub light_type: String,
    pub name: String,
    pub modelid: String,
    pub manufacturername: String,
    pub productname: String,
    pub uniqueid: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
