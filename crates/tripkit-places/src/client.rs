//! HTTP client for the places provider's autocomplete, geocoding, and
//! details endpoints.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use tripkit_core::Coordinates;

use crate::error::PlacesError;
use crate::session::SessionToken;
use crate::types::{GeocodeResult, PlaceDetails, ProviderResponse, Suggestion};

/// Client for the places/geocoding provider.
///
/// Manages the HTTP client, API key, and base URL. Production points at the
/// configured provider base; tests point at a mock server.
pub struct PlacesClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl PlacesClient {
    /// Creates a new client for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tripkit/0.1 (trip-planning)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::InvalidUrl(format!("base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// Fetches autocomplete suggestions for a partial query.
    ///
    /// Empty or whitespace input short-circuits to an empty vec without a
    /// request. `ZERO_RESULTS` is success with an empty vec, never an error.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] on a body-level error status.
    /// - [`PlacesError::Http`] / [`PlacesError::UnexpectedStatus`] /
    ///   [`PlacesError::Deserialize`] on transport or shape failures.
    pub async fn autocomplete(
        &self,
        input: &str,
        session: &SessionToken,
    ) -> Result<Vec<Suggestion>, PlacesError> {
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        let url = self.build_url(
            "maps/api/place/autocomplete/json",
            &[("input", input), ("sessiontoken", session.as_str())],
        )?;
        let envelope: ProviderResponse<Vec<Suggestion>> =
            self.fetch(url, "autocomplete").await?;
        check_provider_status(&envelope.status, envelope.error_message.as_deref())?;

        Ok(envelope.predictions.unwrap_or_default())
    }

    /// Geocodes a free-form address to coordinates, taking the first match.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NoMatch`] when the provider finds nothing.
    /// - Otherwise the same surface as [`PlacesClient::autocomplete`].
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, PlacesError> {
        let url = self.build_url("maps/api/geocode/json", &[("address", address)])?;
        let envelope: ProviderResponse<Vec<GeocodeResult>> = self.fetch(url, "geocode").await?;

        if envelope.status == "ZERO_RESULTS" {
            return Err(PlacesError::NoMatch {
                query: address.to_owned(),
            });
        }
        check_provider_status(&envelope.status, envelope.error_message.as_deref())?;

        envelope
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| PlacesError::NoMatch {
                query: address.to_owned(),
            })
    }

    /// Fetches full details for one place id.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] on a body-level error status, including
    ///   `ZERO_RESULTS` (a detail lookup for a known id should never be
    ///   empty) and a missing `result` payload.
    /// - Otherwise the same surface as [`PlacesClient::autocomplete`].
    pub async fn place_details(
        &self,
        place_id: &str,
        session: &SessionToken,
    ) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "maps/api/place/details/json",
            &[("sessiontoken", session.as_str()), ("place_id", place_id)],
        )?;
        let envelope: ProviderResponse<PlaceDetails> = self.fetch(url, "place_details").await?;

        if envelope.status != "OK" {
            return Err(PlacesError::Provider {
                status: envelope.status,
                message: envelope
                    .error_message
                    .unwrap_or_else(|| "provider error".to_owned()),
            });
        }

        match envelope.result {
            Some(details) => Ok(details),
            None => Err(PlacesError::Provider {
                status: envelope.status,
                message: "details response missing result".to_owned(),
            }),
        }
    }

    /// Builds the full request URL with the API key and percent-encoded
    /// query parameters.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidUrl(format!("endpoint '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response envelope.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<ProviderResponse<T>, PlacesError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: context.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Checks the body-level `status`: `OK` and `ZERO_RESULTS` pass, anything
/// else is a provider error carrying the envelope's message when present.
fn check_provider_status(status: &str, error_message: Option<&str>) -> Result<(), PlacesError> {
    if status == "OK" || status == "ZERO_RESULTS" {
        return Ok(());
    }
    Err(PlacesError::Provider {
        status: status.to_owned(),
        message: error_message.unwrap_or("provider error").to_owned(),
    })
}
