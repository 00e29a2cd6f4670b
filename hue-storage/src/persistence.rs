//! Persistence backends for the key-value document.
//!
//! A backend only knows how to load and save a whole [`Document`]. All key
//! level access happens in memory through [`crate::KeyValueStore`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::{Result, StorageError};

/// The persisted document: a JSON object keyed by section name.
pub type Document = Map<String, Value>;

/// Default file used by the JSON backend.
pub const DEFAULT_STORAGE_FILE: &str = "./hue.json";

/// Load/save capability backing a [`crate::KeyValueStore`].
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Short backend name used in log output.
    fn name(&self) -> &'static str;

    /// Read the full document.
    async fn load(&self) -> Result<Document>;

    /// Overwrite the stored document.
    async fn save(&self, document: &Document) -> Result<()>;
}

/// Stores the document as a single JSON file.
///
/// A missing file is created with an empty object on first load.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFile {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_FILE)
    }
}

#[async_trait]
impl Persistence for JsonFile {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn load(&self) -> Result<Document> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let value: Value = serde_json::from_str(&contents)
                    .map_err(|e| StorageError::Parse(e.to_string()))?;
                match value {
                    Value::Object(document) => Ok(document),
                    Value::Null => Ok(Document::new()),
                    other => Err(StorageError::Parse(format!(
                        "expected a JSON object at the top level, found {}",
                        type_name(&other)
                    ))),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Creating storage file {}", self.path.display());
                tokio::fs::write(&self.path, b"{}").await?;
                Ok(Document::new())
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn save(&self, document: &Document) -> Result<()> {
        let contents = serde_json::to_vec(document)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

/// Keeps the document in memory only.
///
/// Clones share the same underlying document, so a test can hold one handle
/// and inspect what the store saved through another.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    saved: Arc<Mutex<Document>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_document(document: Document) -> Self {
        Self {
            saved: Arc::new(Mutex::new(document)),
        }
    }

    /// Snapshot of the last saved document.
    pub fn saved(&self) -> Document {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl Persistence for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Document> {
        Ok(self.saved.lock().clone())
    }

    async fn save(&self, document: &Document) -> Result<()> {
        *self.saved.lock() = document.clone();
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
