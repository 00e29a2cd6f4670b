//! Bundled light templates.

use crate::error::{Result, StateError};
use crate::model::Light;

const COLOR_LAMP: &str = include_str!("templates/color_lamp.json");
const CATALOGUE: &str = include_str!("templates/lights.json");

/// A fresh copy of the extended color lamp every added light starts from.
pub fn color_lamp() -> Result<Light> {
    serde_json::from_str(COLOR_LAMP).map_err(|e| StateError::Template(format!("color lamp: {e}")))
}

/// Every lamp model a light search can discover.
pub fn catalogue() -> Result<Vec<Light>> {
    serde_json::from_str(CATALOGUE).map_err(|e| StateError::Template(format!("catalogue: {e}")))
}
