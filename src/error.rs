// Error handling module
// Defines the client error taxonomy

use thiserror::Error;

/// Fallback message when the backend gives no usable error text
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors that can occur while talking to the CRM backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (DNS, connection refused, transport timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Authenticated call was rejected and the session could not be recovered.
    /// Session state has already been cleared when this is returned.
    #[error("Session expired: {reason}")]
    SessionExpired { reason: String },

    /// No refresh token is stored
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Refresh endpoint answered with a non-2xx status
    #[error("Token refresh rejected: {status} - {message}")]
    RefreshRejected { status: u16, message: String },

    /// Non-2xx response from the backend
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Body was not the JSON we expected
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Login succeeded but the profile could not be fetched
    #[error("Failed to fetch user profile: {0}")]
    ProfileUnavailable(#[source] Box<ClientError>),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::RefreshRejected { status, .. } => {
                Some(*status)
            }
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            ClientError::ProfileUnavailable(inner) => inner.status(),
            _ => None,
        }
    }

    /// True when the session has been ended and the user must log in again
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired { .. })
    }
}

/// Extract a human readable message from an error body.
/// Looks at `detail`, then `error`, then `message`.
pub fn error_message_from_body(body: &serde_json::Value) -> String {
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(|v| v.as_str()))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
