use serde::Deserialize;

use tripkit_core::Coordinates;

/// A candidate place from autocomplete, not yet resolved to details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    pub description: String,
    pub place_id: String,
}

/// Full details for one place, as the details endpoint returns them.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

/// Provider handle for one photo; the backend's photo proxy resolves it to a
/// servable URL.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRef {
    pub photo_reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeocodeResult {
    pub geometry: Geometry,
}

/// The provider's response envelope. Which payload field is populated
/// depends on the endpoint: details fills `result`, geocoding fills
/// `results`, autocomplete fills `predictions`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ProviderResponse<T> {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub results: Option<T>,
    #[serde(default)]
    pub predictions: Option<T>,
}
