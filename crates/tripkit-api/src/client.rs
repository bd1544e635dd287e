//! Request machinery for the trip backend client.
//!
//! Wraps `reqwest` with bearer-token auth and the backend's error-body
//! convention: non-2xx responses carry a message under `error` on most routes
//! but `erro` on the user routes, so both spellings are checked before
//! falling back to a generic message.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Client for the trip backend REST API.
///
/// Holds the HTTP client and the parsed base URL. The base URL comes from
/// configuration in production and from a mock server's URI in tests.
pub struct TripApi {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
}

impl TripApi {
    /// Creates a new client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidUrl`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tripkit/0.1 (trip-planning)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joining relative endpoint paths appends to the path rather than
        // replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ApiError::InvalidUrl(format!("base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Resolves a relative endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the joined URL does not parse.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("endpoint '{path}': {e}")))
    }

    /// Sends the request, maps non-2xx responses through the error-body
    /// convention, and parses a 2xx body as JSON.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Unauthorized`] / [`ApiError::Api`] on non-2xx statuses.
    /// - [`ApiError::Deserialize`] if a 2xx body does not match `T`.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(response_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Sends the request and discards any 2xx body. Used by DELETE endpoints
    /// whose success payload carries nothing the client needs.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Unauthorized`] / [`ApiError::Api`] on non-2xx statuses.
    pub(crate) async fn request_no_content(request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(response_error(status, &body));
        }

        Ok(())
    }
}

/// Maps a non-2xx response to the matching [`ApiError`] variant, extracting
/// the backend's message when the body has one.
pub(crate) fn response_error(status: StatusCode, body: &str) -> ApiError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("request failed with HTTP status {}", status.as_u16()));

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Unauthorized { message }
    } else {
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pulls the backend's error message out of a response body.
///
/// The backend spells the field `error` on most routes and `erro` on the user
/// routes; an unparsable body yields `None` rather than an error.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "erro"]
        .iter()
        .find_map(|key| value.get(key))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> TripApi {
        TripApi::new(base_url, 30).expect("client construction should not fail")
    }

    #[test]
    fn endpoint_joins_relative_path() {
        let api = test_client("http://localhost:8080");
        let url = api.endpoint("trips/myTrips").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/trips/myTrips");
    }

    #[test]
    fn endpoint_preserves_base_path_prefix() {
        let api = test_client("http://localhost:8080/api/");
        let url = api.endpoint("users/login").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/users/login");
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = TripApi::new("not a url", 30);
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn extract_error_message_reads_error_field() {
        let body = r#"{"error": "Trip not found."}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Trip not found.")
        );
    }

    #[test]
    fn extract_error_message_reads_erro_field() {
        let body = r#"{"erro": "Credenciais inválidas."}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Credenciais inválidas.")
        );
    }

    #[test]
    fn extract_error_message_ignores_unparsable_body() {
        assert_eq!(extract_error_message("<html>502</html>"), None);
    }

    #[test]
    fn response_error_maps_401_to_unauthorized() {
        let err = response_error(StatusCode::UNAUTHORIZED, r#"{"error": "expired token"}"#);
        assert!(
            matches!(err, ApiError::Unauthorized { ref message } if message == "expired token"),
            "got: {err:?}"
        );
    }

    #[test]
    fn response_error_falls_back_to_status_message() {
        let err = response_error(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert!(
            matches!(err, ApiError::Api { status: 502, ref message }
                if message == "request failed with HTTP status 502"),
            "got: {err:?}"
        );
    }
}
