//! # hue-bridge
//!
//! An emulated Philips hue bridge in one process. Clients on the local
//! network find it through SSDP, pair with it and switch its lights like
//! those of a real bridge. Every state change a client makes is handed to
//! a callback, so the emulator can drive anything that is not a hue lamp.
//!
//! ```rust,no_run
//! use hue_bridge::{BridgeConfig, ChangeCallback, HueBridge};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hue_bridge::BridgeError> {
//!     let bridge = HueBridge::start(BridgeConfig::default()).await?;
//!
//!     bridge.add_light(
//!         "desk",
//!         Some(ChangeCallback::from_fn(|key, value| {
//!             println!("desk.{key} => {value}");
//!         })),
//!     )?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     bridge.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! hue-bridge (process wiring, config, logging)
//!     ↓                       ↓
//! hue-discovery          bridge-server (HTTP control plane)
//! (SSDP, description)         ↓
//!                        hue-state (lights, groups, scenes, whitelist)
//!                             ↓
//!                        hue-storage (key-value persistence)
//! ```

mod bridge;
pub mod config;
mod error;
pub mod logging;

pub use bridge::HueBridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};

pub use bridge_server::Profile;
pub use hue_state::{ChangeCallback, LightId};
