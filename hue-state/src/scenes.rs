//! Scene registry

use std::collections::BTreeMap;

use hue_storage::KeyValueStore;
use parking_lot::Mutex;

use crate::error::{Result, StateError};
use crate::model::{Scene, SceneUpdate};
use crate::random;

/// Storage key of the scene map.
pub const SCENES_KEY: &str = "scenes";

/// Registry of scenes keyed by random 15 character ids.
#[derive(Debug)]
pub struct SceneRegistry {
    store: KeyValueStore,
    scenes: Mutex<BTreeMap<String, Scene>>,
}

impl SceneRegistry {
    pub fn load(store: KeyValueStore) -> Result<Self> {
        let scenes = store.get(SCENES_KEY)?.unwrap_or_default();
        Ok(Self {
            store,
            scenes: Mutex::new(scenes),
        })
    }

    /// Store `scene` under a new random id and return the id.
    pub fn create(&self, scene: Scene) -> Result<String> {
        let mut scenes = self.scenes.lock();
        let id = loop {
            let candidate = random::scene_id();
            if !scenes.contains_key(&candidate) {
                break candidate;
            }
        };
        tracing::info!(id = %id, "Added new scene");
        scenes.insert(id.clone(), scene);

        self.write(&scenes)?;
        Ok(id)
    }

    pub fn all(&self) -> BTreeMap<String, Scene> {
        self.scenes.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Scene> {
        self.scenes.lock().get(id).cloned()
    }

    pub fn update(&self, id: &str, update: SceneUpdate) -> Result<Scene> {
        let mut scenes = self.scenes.lock();
        let scene = scenes
            .get_mut(id)
            .ok_or_else(|| StateError::SceneNotFound(id.to_string()))?;
        update.apply(scene);
        let updated = scene.clone();

        self.write(&scenes)?;
        Ok(updated)
    }

    pub fn remove(&self, id: &str) -> Result<Scene> {
        let mut scenes = self.scenes.lock();
        let scene = scenes
            .remove(id)
            .ok_or_else(|| StateError::SceneNotFound(id.to_string()))?;
        tracing::info!(id = %id, "Deleted scene");

        self.write(&scenes)?;
        Ok(scene)
    }

    fn write(&self, scenes: &BTreeMap<String, Scene>) -> Result<()> {
        self.store.set(SCENES_KEY, scenes)?;
        Ok(())
    }
}
