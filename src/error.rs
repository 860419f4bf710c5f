//! Error types and user-facing error reporting.
//!
//! This module defines all client errors and how they are converted
//! into the transient notices a page shows (toast or alert).

use crate::form::ValidationErrors;
use crate::notice::Notice;

/// Client-wide error type.
///
/// This enum represents all possible errors that can occur while talking to
/// the franchise backend or managing local page state.
///
/// # Error Categories
///
/// - **Network Errors**: the request never produced a usable response
/// - **Backend Errors**: non-success status or a `success: false` envelope
/// - **Validation Errors**: field-local form errors, aggregated
/// - **Session Errors**: missing or corrupt stored session
/// - **Local State Errors**: unknown records, duplicate actions, illegal transitions
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request could not be sent or the response could not be read.
    ///
    /// This wraps any reqwest::Error using the `#[from]` attribute.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status or `success: false`.
    ///
    /// `status` is the HTTP status code; the message is the backend's own
    /// when it sent one.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// Form validation failed. Carries the complete field→message map.
    #[error("Please fill all required fields. ({} errors found). Missing: {}", .0.len(), .0.field_list())]
    Validation(ValidationErrors),

    /// Request data is incomplete or malformed before anything is sent.
    #[error("{0}")]
    InvalidInput(String),

    /// Login rejected (wrong password, unknown admin).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No session is stored.
    #[error("Not signed in")]
    SessionMissing,

    /// A stored session could not be parsed.
    #[error("Stored session is unreadable: {0}")]
    SessionCorrupt(serde_json::Error),

    /// Record is not present in the locally fetched set.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// An action for this record is already waiting on the backend.
    #[error("An action is already in progress for {0}")]
    ActionInFlight(String),

    /// Status change that the current status does not allow.
    #[error("Cannot {action} an application that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    /// Attachment refused (too large, wrong type).
    #[error("{0}")]
    Attachment(String),

    /// Response body or stored data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session file could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Base URL or endpoint path is not a valid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Environment configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Stable machine-readable code for this error.
    ///
    /// # Code Mapping
    ///
    /// - `Network` → `network_error`
    /// - `Backend` → `backend_error`
    /// - `Validation` → `validation_failed`
    /// - `SessionMissing` / `SessionCorrupt` → `session_invalid`
    /// - everything else → a code named after the variant
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "network_error",
            ClientError::Backend { .. } => "backend_error",
            ClientError::Validation(_) => "validation_failed",
            ClientError::InvalidInput(_) => "invalid_input",
            ClientError::InvalidCredentials => "invalid_credentials",
            ClientError::SessionMissing | ClientError::SessionCorrupt(_) => "session_invalid",
            ClientError::NotFound(_) => "not_found",
            ClientError::ActionInFlight(_) => "action_in_flight",
            ClientError::InvalidTransition { .. } => "invalid_transition",
            ClientError::Attachment(_) => "attachment_rejected",
            ClientError::Serialization(_) => "serialization_error",
            ClientError::Storage(_) => "storage_error",
            ClientError::Url(_) => "invalid_url",
            ClientError::Config(_) => "config_error",
        }
    }

    /// Convert the error into the notice shown to the user.
    ///
    /// Internal failures (storage, serialization) hide their details
    /// behind a generic retry message, the same way network failures do.
    pub fn to_notice(&self) -> Notice {
        match self {
            ClientError::Network(_) => Notice::error("Network error. Please try again."),
            ClientError::Serialization(_) | ClientError::Storage(_) => {
                Notice::error("An error occurred. Please try again.")
            }
            other => Notice::error(other.to_string()),
        }
    }

    /// True when the failure happened on the wire rather than in local state.
    pub fn is_remote(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Backend { .. })
    }
}
