use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::users::UserSummary;

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

/// A trip as the backend returns it, with its attached places.
///
/// `places` and `collaborators` default to empty/`None` because list
/// endpoints omit them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub collaborators: Option<Vec<Collaborator>>,
}

/// The subset of a trip the attachment menu lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// A place attached to a trip.
///
/// `id` is the backend's row id; `place_id` is the provider's identifier and
/// is unique within one trip's place list. The client-side duplicate check
/// upholds that uniqueness before attaching, it is not assumed of the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: i64,
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub photo_name: Option<Vec<String>>,
    #[serde(default)]
    pub is_destination: bool,
    pub trip_id: i64,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaboratorRole {
    Owner,
    Editor,
    Viewer,
}

impl CollaboratorRole {
    /// The role string the backend uses in JSON bodies and URL paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CollaboratorRole::Owner => "OWNER",
            CollaboratorRole::Editor => "EDITOR",
            CollaboratorRole::Viewer => "VIEWER",
        }
    }
}

impl std::fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's membership in a shared trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: i64,
    pub role: CollaboratorRole,
    pub user_id: i64,
    pub trip_id: i64,
    #[serde(default)]
    pub user: Option<UserSummary>,
}
