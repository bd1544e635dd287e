use thiserror::Error;

/// Errors returned by the trip backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request URL could not be built from the configured base.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The backend rejected the bearer token (401 or 403).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-2xx response. `message` carries the body's `error`/`erro`
    /// field when present, otherwise a generic fallback.
    #[error("backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The user-facing message for this error, or `fallback` when the error
    /// carries nothing a user should see (transport and decoding failures).
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { message } | ApiError::Api { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}
