use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tripkit_core::{AuthUser, CollaboratorRole};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for trip creation. `destination` is the provider place id of the
/// trip's destination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub name: String,
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameTripRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttachPlaceRequest<'a> {
    pub place_id: &'a str,
    pub trip_id: i64,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Successful login or registration: the user plus a bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub user: AuthUser,
    pub token: String,
}

/// Shareable invite URL for a trip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteLink {
    pub invite_url: String,
}

/// Result of accepting an invite link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedInvite {
    #[serde(default)]
    pub message: String,
    pub trip_id: i64,
    pub role: CollaboratorRole,
}

/// Resolved photo URL from the backend's photo proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacePhoto {
    pub url: String,
}
