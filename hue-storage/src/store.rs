//! In-memory key-value document with explicit flushes to a backend.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};
use crate::persistence::{Document, Persistence};

/// Key-value store over a single JSON document.
///
/// Reads and writes are synchronous and only touch the in-memory copy, so
/// callers always observe their latest `set` immediately. Durability is a
/// separate step: [`KeyValueStore::flush`] hands a snapshot of the current
/// document to the backend. Flushes are serialized and each one snapshots the
/// document only once it holds the write slot, so an older snapshot can never
/// land on disk after a newer one.
///
/// Cloning is cheap and yields a handle to the same store.
///
/// # Example
///
/// ```rust
/// use hue_storage::{KeyValueStore, Memory};
///
/// # #[tokio::main]
/// # async fn main() -> hue_storage::Result<()> {
/// let store = KeyValueStore::open(Memory::new()).await?;
/// store.set("whitelist", &vec!["user-a".to_string()])?;
/// let users: Option<Vec<String>> = store.get("whitelist")?;
/// assert_eq!(users, Some(vec!["user-a".to_string()]));
/// store.flush().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KeyValueStore {
    inner: Arc<Inner>,
}

struct Inner {
    document: Mutex<Document>,
    backend: Box<dyn Persistence>,
    write_slot: tokio::sync::Mutex<()>,
}

impl KeyValueStore {
    /// Load the document from `backend` and return a ready store.
    pub async fn open<P>(backend: P) -> Result<Self>
    where
        P: Persistence + 'static,
    {
        let document = backend.load().await?;
        tracing::debug!(
            backend = backend.name(),
            keys = document.len(),
            "Storage document loaded"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                document: Mutex::new(document),
                backend: Box::new(backend),
                write_slot: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Decode the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let document = self.inner.document.lock();
        match document.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| StorageError::Decode {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Encode `value` and store it under `key`, replacing any previous value.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.inner.document.lock().insert(key.to_string(), encoded);
        Ok(())
    }

    /// Remove `key`, returning whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.document.lock().remove(key).is_some()
    }

    /// Check whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.document.lock().contains_key(key)
    }

    /// Copy of the current in-memory document.
    pub fn snapshot(&self) -> Document {
        self.inner.document.lock().clone()
    }

    /// Write the current document to the backend.
    ///
    /// A failed flush leaves the in-memory document untouched.
    pub async fn flush(&self) -> Result<()> {
        let _slot = self.inner.write_slot.lock().await;
        let snapshot = self.snapshot();
        self.inner.backend.save(&snapshot).await
    }

    /// Name of the backend, for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("backend", &self.inner.backend.name())
            .field("key_count", &self.inner.document.lock().len())
            .finish()
    }
}
