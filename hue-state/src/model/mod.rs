//! Records served by the control plane.
//!
//! All records serialize to the JSON shapes a real bridge uses, so they can
//! be handed to clients and written to storage without conversion.

mod group;
mod light;
mod scene;

pub use group::{Group, GroupState, GroupUpdate, NewGroup};
pub use light::{Light, LightId, LightState};
pub use scene::{Scene, SceneUpdate};
