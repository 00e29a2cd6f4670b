//! Light registry
//!
//! Authoritative in-memory collection of lights. Each light may carry a
//! [`ChangeCallback`] that sees every state attribute before it is
//! committed, which is how an emulated light is wired to real hardware.
//!
//! ```text
//! PUT /lights/3/state {"on": true, "bri": 100}
//!   ├── callback("on", true)    → commit state.on
//!   └── callback("bri", 100)    → commit state.bri
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hue_storage::KeyValueStore;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::{Result, StateError};
use crate::model::{Light, LightId};
use crate::templates;

/// Storage key of the light map.
pub const LIGHTS_KEY: &str = "lights";

/// Error type change callbacks may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

type CallbackFn = dyn Fn(&str, &Value) -> std::result::Result<(), CallbackError> + Send + Sync;

/// Hook invoked with `(attribute, value)` for every state attribute a client
/// sets on a light.
///
/// Errors and panics raised by the hook are logged and otherwise ignored;
/// the attribute is committed either way.
#[derive(Clone)]
pub struct ChangeCallback(Arc<CallbackFn>);

impl ChangeCallback {
    /// Wrap a fallible hook.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &Value) -> std::result::Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a hook that cannot fail.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        Self::new(move |key, value| {
            f(key, value);
            Ok(())
        })
    }

    fn invoke(&self, light: LightId, key: &str, value: &Value) {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.0)(key, value))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(light, key, error = %e, "Change callback failed");
            }
            Err(_) => {
                tracing::warn!(light, key, "Change callback panicked");
            }
        }
    }
}

impl fmt::Debug for ChangeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangeCallback")
    }
}

/// One applied attribute, reported back as `{"<address>": <value>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    pub address: String,
    pub value: Value,
}

struct Inner {
    lights: BTreeMap<LightId, Light>,
    callbacks: HashMap<LightId, ChangeCallback>,
    next_id: LightId,
}

/// Registry of lights keyed by sequentially assigned ids.
///
/// Ids start at 0 (or one past the highest stored id) and are never handed
/// out twice by the same registry, even after a delete.
pub struct LightRegistry {
    store: KeyValueStore,
    inner: Mutex<Inner>,
}

impl LightRegistry {
    /// Load the lights stored under [`LIGHTS_KEY`].
    ///
    /// Entries whose key is not a light id are skipped with a warning.
    pub fn load(store: KeyValueStore) -> Result<Self> {
        let stored: BTreeMap<String, Light> = store.get(LIGHTS_KEY)?.unwrap_or_default();

        let mut lights = BTreeMap::new();
        for (key, light) in stored {
            match key.parse::<LightId>() {
                Ok(id) => {
                    lights.insert(id, light);
                }
                Err(_) => tracing::warn!(key = %key, "Skipping stored light with invalid id"),
            }
        }

        let next_id = lights.keys().next_back().map_or(0, |id| id + 1);
        tracing::debug!(count = lights.len(), next_id, "Lights loaded");

        Ok(Self {
            store,
            inner: Mutex::new(Inner {
                lights,
                callbacks: HashMap::new(),
                next_id,
            }),
        })
    }

    /// Add a color lamp named `name` and return its id.
    ///
    /// Every light gets its own copy of the template. Names need not be
    /// unique.
    pub fn add_light(&self, name: &str, on_change: Option<ChangeCallback>) -> Result<LightId> {
        let mut light = templates::color_lamp()?;
        light.name = name.to_string();
        self.insert(light, on_change)
    }

    /// Register `light` under the next id.
    pub fn insert(&self, light: Light, on_change: Option<ChangeCallback>) -> Result<LightId> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        tracing::info!(id, name = %light.name, "Added new light");
        inner.lights.insert(id, light);
        if let Some(callback) = on_change {
            inner.callbacks.insert(id, callback);
        }

        self.write(&inner.lights)?;
        Ok(id)
    }

    /// All lights in id order, which is also insertion order.
    pub fn all(&self) -> BTreeMap<LightId, Light> {
        self.inner.lock().lights.clone()
    }

    pub fn get(&self, id: LightId) -> Option<Light> {
        self.inner.lock().lights.get(&id).cloned()
    }

    pub fn contains(&self, id: LightId) -> bool {
        self.inner.lock().lights.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lights.is_empty()
    }

    /// Apply a partial state update, attribute by attribute, in the order
    /// the attributes were supplied.
    ///
    /// For every attribute the light's callback runs first, then the value is
    /// written into the light's state. An unknown id fails the whole update
    /// without invoking any callback.
    pub fn apply_state_update(
        &self,
        id: LightId,
        attributes: &Map<String, Value>,
    ) -> Result<Vec<AttributeUpdate>> {
        let callback = {
            let inner = self.inner.lock();
            if !inner.lights.contains_key(&id) {
                return Err(StateError::LightNotFound(id.to_string()));
            }
            inner.callbacks.get(&id).cloned()
        };

        let mut updates = Vec::with_capacity(attributes.len());
        for (key, value) in attributes {
            // The registry lock is not held here so the callback may read it.
            if let Some(callback) = &callback {
                callback.invoke(id, key, value);
            }

            let mut inner = self.inner.lock();
            let light = inner
                .lights
                .get_mut(&id)
                .ok_or_else(|| StateError::LightNotFound(id.to_string()))?;
            light.state.set(key.clone(), value.clone());
            tracing::debug!(light = id, key = %key, value = %value, "Light state changed");

            updates.push(AttributeUpdate {
                address: format!("/lights/{id}/state/{key}"),
                value: value.clone(),
            });
        }

        self.write(&self.inner.lock().lights)?;
        Ok(updates)
    }

    /// Rename a light.
    pub fn rename(&self, id: LightId, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let light = inner
            .lights
            .get_mut(&id)
            .ok_or_else(|| StateError::LightNotFound(id.to_string()))?;
        light.name = name.to_string();
        self.write(&inner.lights)
    }

    /// Remove a light together with its callback.
    pub fn remove(&self, id: LightId) -> Result<Light> {
        let mut inner = self.inner.lock();
        let light = inner
            .lights
            .remove(&id)
            .ok_or_else(|| StateError::LightNotFound(id.to_string()))?;
        inner.callbacks.remove(&id);
        tracing::info!(id, "Deleted light");

        self.write(&inner.lights)?;
        Ok(light)
    }

    fn write(&self, lights: &BTreeMap<LightId, Light>) -> Result<()> {
        self.store.set(LIGHTS_KEY, lights)?;
        Ok(())
    }
}

impl fmt::Debug for LightRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LightRegistry")
            .field("lights", &inner.lights.len())
            .field("callbacks", &inner.callbacks.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hue_storage::Memory;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn registry() -> LightRegistry {
        let store = KeyValueStore::open(Memory::new()).await.unwrap();
        LightRegistry::load(store).unwrap()
    }

    fn attributes(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_add_light_assigns_ids_from_zero() {
        let registry = registry().await;
        assert_eq!(registry.add_light("foo", None).unwrap(), 0);
        assert_eq!(registry.add_light("foo", None).unwrap(), 1);
        assert_eq!(registry.add_light("bar", None).unwrap(), 2);

        let names: Vec<_> = registry.all().into_values().map(|l| l.name).collect();
        assert_eq!(names, ["foo", "foo", "bar"]);
    }

    #[tokio::test]
    async fn test_lights_do_not_share_state() {
        let registry = registry().await;
        let a = registry.add_light("a", None).unwrap();
        let b = registry.add_light("b", None).unwrap();

        registry
            .apply_state_update(a, &attributes(json!({"on": true})))
            .unwrap();

        assert!(registry.get(a).unwrap().state.on());
        assert!(!registry.get(b).unwrap().state.on());
        assert!(!templates::color_lamp().unwrap().state.on());
    }

    #[tokio::test]
    async fn test_state_update_reports_each_attribute_in_order() {
        let registry = registry().await;
        let id = registry.add_light("foo", None).unwrap();

        let updates = registry
            .apply_state_update(id, &attributes(json!({"on": true, "bri": 100})))
            .unwrap();

        assert_eq!(
            updates,
            vec![
                AttributeUpdate {
                    address: "/lights/0/state/on".to_string(),
                    value: json!(true)
                },
                AttributeUpdate {
                    address: "/lights/0/state/bri".to_string(),
                    value: json!(100)
                },
            ]
        );
        let light = registry.get(id).unwrap();
        assert!(light.state.on());
        assert_eq!(light.state.bri(), Some(100));
    }

    #[tokio::test]
    async fn test_unknown_attributes_are_stored() {
        let registry = registry().await;
        let id = registry.add_light("foo", None).unwrap();
        registry
            .apply_state_update(id, &attributes(json!({"transitiontime": 4})))
            .unwrap();
        assert_eq!(
            registry.get(id).unwrap().state.get("transitiontime"),
            Some(&json!(4))
        );
    }

    #[tokio::test]
    async fn test_callback_sees_value_before_commit() {
        let registry = Arc::new(registry().await);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let observer = Arc::clone(&registry);
        let log = Arc::clone(&seen);
        let callback = ChangeCallback::from_fn(move |key, value| {
            let committed = observer.get(0).and_then(|l| l.state.get(key).cloned());
            log.lock().push((key.to_string(), value.clone(), committed));
        });
        registry.add_light("foo", Some(callback)).unwrap();

        registry
            .apply_state_update(0, &attributes(json!({"bri": 7})))
            .unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "bri");
        assert_eq!(seen[0].1, json!(7));
        assert_eq!(seen[0].2, Some(json!(254)));
    }

    #[tokio::test]
    async fn test_failing_callback_does_not_block_commit() {
        let registry = registry().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let callback = ChangeCallback::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("device offline".into())
        });
        let id = registry.add_light("foo", Some(callback)).unwrap();

        let updates = registry
            .apply_state_update(id, &attributes(json!({"on": true, "sat": 10})))
            .unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let light = registry.get(id).unwrap();
        assert!(light.state.on());
        assert_eq!(light.state.sat(), Some(10));
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_block_commit() {
        let registry = registry().await;
        let callback = ChangeCallback::from_fn(|key, _| {
            if key == "on" {
                panic!("boom");
            }
        });
        let id = registry.add_light("foo", Some(callback)).unwrap();

        registry
            .apply_state_update(id, &attributes(json!({"on": true, "bri": 1})))
            .unwrap();

        let light = registry.get(id).unwrap();
        assert!(light.state.on());
        assert_eq!(light.state.bri(), Some(1));
    }

    #[tokio::test]
    async fn test_unknown_light_invokes_no_callback() {
        let registry = registry().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry
            .add_light(
                "foo",
                Some(ChangeCallback::from_fn(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .unwrap();

        let result = registry.apply_state_update(9, &attributes(json!({"on": true})));
        assert!(matches!(result, Err(StateError::LightNotFound(id)) if id == "9"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let registry = registry().await;
        registry.add_light("a", None).unwrap();
        let b = registry.add_light("b", None).unwrap();
        registry.remove(b).unwrap();
        assert_eq!(registry.add_light("c", None).unwrap(), 2);
        assert!(matches!(registry.remove(b), Err(StateError::LightNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_drops_callback() {
        let registry = registry().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = registry
            .add_light(
                "foo",
                Some(ChangeCallback::from_fn(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .unwrap();
        registry.remove(id).unwrap();
        assert!(format!("{registry:?}").contains("callbacks: 0"));
    }

    #[tokio::test]
    async fn test_rename() {
        let registry = registry().await;
        let id = registry.add_light("foo", None).unwrap();
        registry.rename(id, "bar").unwrap();
        assert_eq!(registry.get(id).unwrap().name, "bar");
        assert!(registry.rename(5, "x").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mutations_are_written_to_store() {
        let store = KeyValueStore::open(Memory::new()).await.unwrap();
        let registry = LightRegistry::load(store.clone()).unwrap();
        let id = registry.add_light("foo", None).unwrap();
        registry
            .apply_state_update(id, &attributes(json!({"on": true})))
            .unwrap();

        let stored: BTreeMap<String, Light> = store.get(LIGHTS_KEY).unwrap().unwrap();
        assert!(stored["0"].state.on());
    }

    #[tokio::test]
    async fn test_load_continues_after_highest_id() {
        let store = KeyValueStore::open(Memory::new()).await.unwrap();
        let mut lamp = templates::color_lamp().unwrap();
        lamp.name = "stored".to_string();
        let mut stored = BTreeMap::new();
        stored.insert("4".to_string(), lamp.clone());
        stored.insert("bogus".to_string(), lamp);
        store.set(LIGHTS_KEY, &stored).unwrap();

        let registry = LightRegistry::load(store).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(4).unwrap().name, "stored");
        assert_eq!(registry.add_light("new", None).unwrap(), 5);
    }
}
