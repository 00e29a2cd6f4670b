//! Hue bridge state
//!
//! The records an emulated bridge serves and the rules for mutating them.
//!
//! # Features
//!
//! - **Lights**: sequential ids, per-light change callbacks, partial state
//!   updates with per-attribute results
//! - **Groups and scenes**: create, update, delete
//! - **Whitelist**: paired usernames
//! - **Light search**: two-step search and commit of catalogue lamps
//!
//! # Architecture
//!
//! ```text
//! HueState
//! ├── Whitelist       "whitelist"
//! ├── LightRegistry   "lights"   + callbacks (process only)
//! ├── GroupRegistry   "groups"
//! ├── SceneRegistry   "scenes"
//! └── LightScan       (process only)
//!         │
//!         ▼
//!   KeyValueStore ──flush──▶ Persistence
//! ```
//!
//! Every mutation is applied in memory and written into the shared
//! [`hue_storage::KeyValueStore`] synchronously; [`HueState::persist`]
//! then flushes the document to its backend.
//!
//! # Quick Start
//!
//! ```rust
//! use hue_state::{ChangeCallback, HueState};
//! use hue_storage::{KeyValueStore, Memory};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> hue_state::Result<()> {
//! let state = HueState::load(KeyValueStore::open(Memory::new()).await?)?;
//!
//! let id = state.lights().add_light(
//!     "Desk",
//!     Some(ChangeCallback::from_fn(|key, value| println!("desk.{key} => {value}"))),
//! )?;
//!
//! let update = json!({"on": true, "bri": 100});
//! let results = state.lights().apply_state_update(id, update.as_object().unwrap())?;
//! assert_eq!(results[0].address, "/lights/0/state/on");
//! state.persist().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod groups;
pub mod lights;
pub mod model;
pub mod random;
pub mod scan;
pub mod scenes;
mod state;
pub mod templates;
pub mod whitelist;

pub use error::{Result, StateError};
pub use groups::GroupRegistry;
pub use lights::{AttributeUpdate, CallbackError, ChangeCallback, LightRegistry};
pub use model::{Group, GroupState, GroupUpdate, Light, LightId, LightState, NewGroup, Scene, SceneUpdate};
pub use scan::{LightScan, NewLights};
pub use scenes::SceneRegistry;
pub use state::HueState;
pub use whitelist::Whitelist;
