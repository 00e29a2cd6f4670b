//! Payloads of the control plane.
//!
//! A real bridge answers every API call with HTTP 200 and reports failures
//! inside the body:
//!
//! ```text
//! [{"error": {"type": 1, "address": "/", "description": "unauthorized user"}}]
//! [{"success": {"/lights/0/state/on": true}}]
//! [{"success": "/lights/0 deleted"}]
//! ```

use serde_json::{json, Map, Value};

/// Error codes reported in `error.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    UnauthorizedUser = 1,
    MissingParameter = 5,
    InternalError = 901,
}

impl ErrorType {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorType::UnauthorizedUser => "unauthorized user",
            ErrorType::MissingParameter => "invalid/missing parameters in body",
            ErrorType::InternalError => "Internal error occurred",
        }
    }
}

/// `[{"error": {"type": .., "address": .., "description": ..}}]`
pub fn error(error_type: ErrorType, address: &str) -> Value {
    json!([{
        "error": {
            "type": error_type.code(),
            "address": address,
            "description": error_type.description(),
        }
    }])
}

/// `[{"success": {"<address>": <value>}}]`
pub fn success_structure(address: &str, value: impl Into<Value>) -> Value {
    Value::Array(vec![success_entry(address, value.into())])
}

/// `[{"success": "<message>"}]`
pub fn success(message: &str) -> Value {
    json!([{ "success": message }])
}

/// One `{"success": {"<address>": <value>}}` entry, for replies that list
/// several applied attributes.
pub fn success_entry(address: &str, value: Value) -> Value {
    let mut applied = Map::new();
    applied.insert(address.to_string(), value);
    json!({ "success": applied })
}
