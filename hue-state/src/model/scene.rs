//! Scene types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::LightState;

/// A scene, stored as the client supplied it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lights: Option<Vec<String>>,
    /// Target state per light id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightstates: Option<BTreeMap<String, LightState>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `PUT /api/<user>/scenes/<id>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneUpdate {
    pub name: Option<String>,
    pub lights: Option<Vec<String>>,
    pub lightstates: Option<BTreeMap<String, LightState>>,
}

impl SceneUpdate {
    /// Apply to `scene`. Light states are merged per light id, replacing the
    /// state of each light named in the update.
    pub(crate) fn apply(self, scene: &mut Scene) {
        if let Some(name) = self.name.filter(|name| !name.is_empty()) {
            scene.name = Some(name);
        }
        if let Some(lights) = self.lights {
            scene.lights = Some(lights);
        }
        if let Some(lightstates) = self.lightstates {
            scene
                .lightstates
                .get_or_insert_with(BTreeMap::new)
                .extend(lightstates);
        }
    }
}
