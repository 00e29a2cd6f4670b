//! Group types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::LightState;

/// Aggregate on/off state of a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    pub all_on: bool,
    pub any_on: bool,
}

/// A light group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub name: String,
    /// Member light ids
    pub lights: Vec<String>,
    pub sensors: Vec<Value>,
    #[serde(rename = "type")]
    pub group_type: String,
    pub state: GroupState,
    pub recycle: bool,
    pub class: String,
    /// Last action applied to the group
    pub action: LightState,
}

impl Default for Group {
    fn default() -> Self {
        let mut action = LightState::new();
        action.set("on", Value::Bool(false));
        action.set("alert", Value::String("none".to_string()));

        Self {
            name: "Group".to_string(),
            lights: Vec::new(),
            sensors: Vec::new(),
            group_type: "LightGroup".to_string(),
            state: GroupState::default(),
            recycle: false,
            class: "Other".to_string(),
            action,
        }
    }
}

/// Body of `POST /api/<user>/groups`
///
/// Only these attributes are taken from the client; everything else starts
/// at its default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGroup {
    pub name: Option<String>,
    pub lights: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub class: Option<String>,
}

impl From<NewGroup> for Group {
    fn from(request: NewGroup) -> Self {
        let defaults = Group::default();
        Self {
            name: request.name.unwrap_or(defaults.name),
            lights: request.lights.unwrap_or(defaults.lights),
            group_type: request.group_type.unwrap_or(defaults.group_type),
            class: request.class.unwrap_or(defaults.class),
            ..defaults
        }
    }
}

/// Body of `PUT /api/<user>/groups/<id>`
///
/// Absent or empty values leave the attribute unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub lights: Option<Vec<String>>,
    pub class: Option<String>,
}

impl GroupUpdate {
    pub(crate) fn apply(self, group: &mut Group) {
        if let Some(name) = self.name.filter(|name| !name.is_empty()) {
            group.name = name;
        }
        if let Some(lights) = self.lights {
            group.lights = lights;
        }
        if let Some(class) = self.class.filter(|class| !class.is_empty()) {
            group.class = class;
        }
    }
}
