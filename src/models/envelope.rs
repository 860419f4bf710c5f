//! Response envelope used by the franchise backend.
//!
//! Most endpoints answer with
//!
//! ```json
//! { "success": true, "message": "...", "data": ... }
//! ```
//!
//! but a few return the bare payload, and the bank list may hold either a
//! single object or an array.

use serde::Deserialize;
use serde_json::Value;

/// Standard `{ success, message, data }` wrapper.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Missing `success` is treated as success; the HTTP status decides.
    #[serde(default = "default_success")]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Whether a decoded body is a `{ success, message, data }` envelope rather
/// than a bare payload.
pub fn is_envelope(body: &Value) -> bool {
    body.as_object()
        .is_some_and(|map| map.contains_key("success") || map.contains_key("data"))
}

/// `data` that may be one object or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Error body sent with a non-success status. Only the message matters.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
