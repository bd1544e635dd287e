use thiserror::Error;

/// Errors returned by the places provider client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request URL could not be built from the configured base.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The provider answered with a non-2xx HTTP status.
    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The body-level `status` was neither `OK` nor `ZERO_RESULTS`.
    #[error("provider status {status}: {message}")]
    Provider { status: String, message: String },

    /// Geocoding found nothing for the query.
    #[error("no geocoding match for '{query}'")]
    NoMatch { query: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
