//! HTTP control plane of the hue bridge emulator.
//!
//! This crate turns a [`hue_state::HueState`] into the REST surface bridge
//! clients expect. It has no knowledge of discovery beyond rendering the
//! description document clients fetch after an SSDP search.
//!
//! # Overview
//!
//! - [`ControlPlane`]: transport-independent dispatcher from
//!   `(method, path, body)` to a [`Reply`]. Pairing, lights, groups, scenes.
//! - [`BridgeServer`]: warp listener exposing `/description.xml` and the
//!   control plane.
//! - [`response`]: the success/error payload shapes.
//!
//! # Architecture
//!
//! ```text
//! client ──HTTP──▶ BridgeServer ──▶ ControlPlane ──▶ HueState ──▶ KeyValueStore
//!                      │                 │
//!                      │                 └─ user check, per-attribute results
//!                      └─ GET /description.xml
//! ```
//!
//! Failures never surface as HTTP status codes: the dispatcher always
//! answers 200 with an error payload, except for paths that have no handler
//! at all.

mod control;
mod error;
pub mod response;
mod server;

pub use control::{ControlPlane, Profile, Reply, DEMO_USERNAME};
pub use error::{Result, ServerError};
pub use response::ErrorType;
pub use server::{BridgeServer, ServerConfig};
