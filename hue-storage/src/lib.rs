//! Generic key-value persistence for the hue bridge emulator.
//!
//! The bridge keeps its whitelist, lights, groups and scenes in one JSON
//! document. This crate provides the document store and nothing domain
//! specific; each registry in `hue-state` composes a [`KeyValueStore`] and
//! owns its own key.
//!
//! # Overview
//!
//! - [`Persistence`]: load/save capability for a whole [`Document`].
//!   [`JsonFile`] writes to disk, [`Memory`] keeps everything in process.
//! - [`KeyValueStore`]: synchronous `get`/`set`/`delete` on the in-memory
//!   document plus an async [`KeyValueStore::flush`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hue_storage::{JsonFile, KeyValueStore};
//!
//! # #[tokio::main]
//! # async fn main() -> hue_storage::Result<()> {
//! let store = KeyValueStore::open(JsonFile::new("./hue.json")).await?;
//! store.set("whitelist", &["0123456789abcdefghijklmnopqrs"])?;
//! store.flush().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod persistence;
mod store;

pub use error::{Result, StorageError};
pub use persistence::{Document, JsonFile, Memory, Persistence, DEFAULT_STORAGE_FILE};
pub use store::KeyValueStore;
