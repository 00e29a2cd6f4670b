//! Everything one emulated bridge knows.

use hue_storage::KeyValueStore;

use crate::error::Result;
use crate::groups::GroupRegistry;
use crate::lights::LightRegistry;
use crate::scan::{LightScan, NewLights};
use crate::scenes::SceneRegistry;
use crate::whitelist::Whitelist;

/// Whitelist, registries and scan state of one bridge, sharing one store.
///
/// Each bridge owns its own `HueState`; nothing here is process-global, so
/// several bridges can run side by side in one process.
#[derive(Debug)]
pub struct HueState {
    store: KeyValueStore,
    whitelist: Whitelist,
    lights: LightRegistry,
    groups: GroupRegistry,
    scenes: SceneRegistry,
    scan: LightScan,
}

impl HueState {
    /// Build every registry from the contents of `store`.
    pub fn load(store: KeyValueStore) -> Result<Self> {
        Ok(Self {
            whitelist: Whitelist::load(store.clone())?,
            lights: LightRegistry::load(store.clone())?,
            groups: GroupRegistry::load(store.clone())?,
            scenes: SceneRegistry::load(store.clone())?,
            scan: LightScan::new(),
            store,
        })
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn scenes(&self) -> &SceneRegistry {
        &self.scenes
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    /// Start a search for new lights.
    pub fn search_new_lights(&self) -> Result<()> {
        self.scan.search()
    }

    /// Commit the light found by the last search, if any, and report it
    /// with the time of that search.
    pub fn new_lights(&self) -> Result<NewLights> {
        let (pending, lastscan) = self.scan.take_pending();
        let found = match pending {
            Some(light) => {
                let name = light.name.clone();
                let id = self.lights.insert(light, None)?;
                Some((id, name))
            }
            None => None,
        };

        Ok(NewLights { found, lastscan })
    }

    /// Write the current document to the storage backend.
    pub async fn persist(&self) -> Result<()> {
        self.store.flush().await?;
        Ok(())
    }
}
