//! Group registry

use std::collections::BTreeMap;

use hue_storage::KeyValueStore;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::{Result, StateError};
use crate::lights::AttributeUpdate;
use crate::model::{Group, GroupUpdate};

/// Storage key of the group map.
pub const GROUPS_KEY: &str = "groups";

/// Registry of light groups.
///
/// A new group gets one past the highest existing id, or `0` when there
/// are none, so ids freed by deleting the newest group are handed out again.
#[derive(Debug)]
pub struct GroupRegistry {
    store: KeyValueStore,
    groups: Mutex<BTreeMap<u32, Group>>,
}

impl GroupRegistry {
    pub fn load(store: KeyValueStore) -> Result<Self> {
        let stored: BTreeMap<String, Group> = store.get(GROUPS_KEY)?.unwrap_or_default();
        let groups = stored
            .into_iter()
            .filter_map(|(key, group)| match key.parse::<u32>() {
                Ok(id) => Some((id, group)),
                Err(_) => {
                    tracing::warn!(key = %key, "Skipping stored group with invalid id");
                    None
                }
            })
            .collect();

        Ok(Self {
            store,
            groups: Mutex::new(groups),
        })
    }

    /// Store `group` and return its id.
    pub fn create(&self, group: Group) -> Result<String> {
        let mut groups = self.groups.lock();
        let id = groups.keys().next_back().map_or(0, |id| id + 1);
        groups.insert(id, group);
        tracing::info!(id, "Added new group");

        self.write(&groups)?;
        Ok(id.to_string())
    }

    pub fn all(&self) -> BTreeMap<u32, Group> {
        self.groups.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Group> {
        let key = id.parse::<u32>().ok()?;
        self.groups.lock().get(&key).cloned()
    }

    /// Change name, member lights or class of a group.
    pub fn update(&self, id: &str, update: GroupUpdate) -> Result<Group> {
        self.modify(id, |group| {
            update.apply(group);
            group.clone()
        })
    }

    /// Merge `attributes` into the group's action, reporting each one.
    ///
    /// Setting `on` also updates the aggregate `all_on`/`any_on` state.
    pub fn set_action(&self, id: &str, attributes: &Map<String, Value>) -> Result<Vec<AttributeUpdate>> {
        self.modify(id, |group| {
            group.action.merge(attributes);
            if let Some(on) = attributes.get("on").and_then(Value::as_bool) {
                group.state.all_on = on;
                group.state.any_on = on;
            }

            attributes
                .iter()
                .map(|(key, value)| AttributeUpdate {
                    address: format!("/groups/{id}/action/{key}"),
                    value: value.clone(),
                })
                .collect()
        })
    }

    pub fn remove(&self, id: &str) -> Result<Group> {
        let key = Self::key(id)?;
        let mut groups = self.groups.lock();
        let group = groups
            .remove(&key)
            .ok_or_else(|| StateError::GroupNotFound(id.to_string()))?;
        tracing::info!(id = key, "Deleted group");

        self.write(&groups)?;
        Ok(group)
    }

    fn modify<T>(&self, id: &str, f: impl FnOnce(&mut Group) -> T) -> Result<T> {
        let key = Self::key(id)?;
        let mut groups = self.groups.lock();
        let group = groups
            .get_mut(&key)
            .ok_or_else(|| StateError::GroupNotFound(id.to_string()))?;
        let output = f(group);

        self.write(&groups)?;
        Ok(output)
    }

    fn key(id: &str) -> Result<u32> {
        id.parse()
            .map_err(|_| StateError::GroupNotFound(id.to_string()))
    }

    fn write(&self, groups: &BTreeMap<u32, Group>) -> Result<()> {
        self.store.set(GROUPS_KEY, groups)?;
        Ok(())
    }
}
