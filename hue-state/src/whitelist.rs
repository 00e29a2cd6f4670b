//! Paired usernames.

use hue_storage::KeyValueStore;
use parking_lot::Mutex;

use crate::error::Result;
use crate::random;

/// Storage key of the username list.
pub const WHITELIST_KEY: &str = "whitelist";

/// Usernames allowed on `/api/<user>/...` routes.
#[derive(Debug)]
pub struct Whitelist {
    store: KeyValueStore,
    users: Mutex<Vec<String>>,
}

impl Whitelist {
    pub fn load(store: KeyValueStore) -> Result<Self> {
        let users = store.get(WHITELIST_KEY)?.unwrap_or_default();
        Ok(Self {
            store,
            users: Mutex::new(users),
        })
    }

    /// Add `name`. Returns `false` when it was already present.
    pub fn add_user(&self, name: &str) -> Result<bool> {
        let mut users = self.users.lock();
        if users.iter().any(|user| user == name) {
            return Ok(false);
        }
        users.push(name.to_string());
        self.store.set(WHITELIST_KEY, &*users)?;
        Ok(true)
    }

    /// Generate a fresh username and add it.
    pub fn create_user(&self) -> Result<String> {
        loop {
            let name = random::username();
            if self.add_user(&name)? {
                tracing::info!("Paired new user");
                return Ok(name);
            }
        }
    }

    /// Whether `name` may use the control plane. Empty names never match.
    pub fn check_user(&self, name: &str) -> bool {
        !name.is_empty() && self.users.lock().iter().any(|user| user == name)
    }

    pub fn users(&self) -> Vec<String> {
        self.users.lock().clone()
    }
}
