//! Trip, place, collaborator, and invite endpoints for the trip backend
//! client. All of these require a bearer token except the photo proxy.

use tripkit_core::{CollaboratorRole, Place, Trip, TripSummary};

use crate::client::TripApi;
use crate::error::ApiError;
use crate::types::{
    AcceptedInvite, AttachPlaceRequest, InviteLink, NewTrip, PlacePhoto, RenameTripRequest,
};

impl TripApi {
    /// Lists the authenticated user's trips.
    ///
    /// The backend returns full trip objects here; only the id/name pairs the
    /// attachment menu needs are kept.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] on a rejected token.
    /// - [`ApiError::Http`] / [`ApiError::Api`] / [`ApiError::Deserialize`]
    ///   on other failures.
    pub async fn my_trips(&self, token: &str) -> Result<Vec<TripSummary>, ApiError> {
        let url = self.endpoint("trips/myTrips")?;
        let request = self.client.get(url).bearer_auth(token);
        Self::request_json(request, "my_trips").await
    }

    /// Fetches one trip with its places and collaborators.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn trip(&self, token: &str, trip_id: i64) -> Result<Trip, ApiError> {
        let url = self.endpoint(&format!("trips/{trip_id}"))?;
        let request = self.client.get(url).bearer_auth(token);
        Self::request_json(request, "trip").await
    }

    /// Creates a trip, returning the backend's stored version.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn create_trip(&self, token: &str, new_trip: &NewTrip) -> Result<Trip, ApiError> {
        let url = self.endpoint("trips")?;
        let request = self.client.post(url).bearer_auth(token).json(new_trip);
        Self::request_json(request, "create_trip").await
    }

    /// Renames a trip, returning the updated trip. Callers display exactly
    /// the name this returns, not the name they sent.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn rename_trip(&self, token: &str, trip_id: i64, name: &str) -> Result<Trip, ApiError> {
        let url = self.endpoint(&format!("trips/{trip_id}"))?;
        let request = self
            .client
            .patch(url)
            .bearer_auth(token)
            .json(&RenameTripRequest { name });
        Self::request_json(request, "rename_trip").await
    }

    /// Deletes a trip.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn delete_trip(&self, token: &str, trip_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("trips/{trip_id}"))?;
        Self::request_no_content(self.client.delete(url).bearer_auth(token)).await
    }

    /// Fetches a trip with its `places` list populated. This is the read the
    /// duplicate check runs before attaching a place.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn trip_places(&self, token: &str, trip_id: i64) -> Result<Trip, ApiError> {
        let url = self.endpoint(&format!("tripPlaces/{trip_id}"))?;
        let request = self.client.get(url).bearer_auth(token);
        Self::request_json(request, "trip_places").await
    }

    /// Attaches a place to a trip by provider place id, returning the created
    /// place row. The backend resolves the id to name, address, and
    /// coordinates itself.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn attach_place(
        &self,
        token: &str,
        place_id: &str,
        trip_id: i64,
    ) -> Result<Place, ApiError> {
        let url = self.endpoint("tripPlaces")?;
        let request = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&AttachPlaceRequest { place_id, trip_id });
        Self::request_json(request, "attach_place").await
    }

    /// Removes one place (by its row id) from a trip.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn delete_place(&self, token: &str, trip_id: i64, place_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("trips/{trip_id}/places/{place_id}"))?;
        Self::request_no_content(self.client.delete(url).bearer_auth(token)).await
    }

    /// Removes a collaborator from a trip.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn delete_collaborator(
        &self,
        token: &str,
        trip_id: i64,
        collaborator_id: i64,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("trips/{trip_id}/collaborators/{collaborator_id}"))?;
        Self::request_no_content(self.client.delete(url).bearer_auth(token)).await
    }

    /// Creates a shareable invite link granting `role` on the trip.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn create_invite_link(
        &self,
        token: &str,
        trip_id: i64,
        role: CollaboratorRole,
    ) -> Result<InviteLink, ApiError> {
        let url = self.endpoint(&format!("trips/{trip_id}/link/{role}"))?;
        let request = self.client.post(url).bearer_auth(token);
        Self::request_json(request, "create_invite_link").await
    }

    /// Accepts an invite link's token, joining the trip it belongs to.
    ///
    /// # Errors
    ///
    /// See [`TripApi::my_trips`].
    pub async fn accept_invite(
        &self,
        token: &str,
        invite_token: &str,
    ) -> Result<AcceptedInvite, ApiError> {
        let url = self.endpoint(&format!("trips/links/{invite_token}/accept"))?;
        let request = self.client.post(url).bearer_auth(token);
        Self::request_json(request, "accept_invite").await
    }

    /// Resolves a provider photo name to a servable URL through the backend's
    /// photo proxy. No token required.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Api`] / [`ApiError::Deserialize`]
    ///   on failure.
    pub async fn place_photo_url(&self, photo_name: &str) -> Result<PlacePhoto, ApiError> {
        let mut url = self.endpoint("tripPlaces/photo")?;
        url.query_pairs_mut().append_pair("photoName", photo_name);
        let request = self.client.get(url);
        Self::request_json(request, "place_photo_url").await
    }
}
