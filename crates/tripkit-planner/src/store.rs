use std::collections::HashMap;

use tripkit_core::{Place, Trip};

use crate::reconcile;

/// In-memory cache of trips the client has loaded, keyed by trip id.
///
/// The picker's duplicate check and the reconciler's merges read and write
/// this one store, so an attachment made in this session is visible to the
/// next duplicate check without a refetch. Mutations go through the
/// `apply_*` methods, which delegate to the merge functions in
/// [`crate::reconcile`].
#[derive(Debug, Default)]
pub struct TripStore {
    trips: HashMap<i64, Trip>,
}

impl TripStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a fetched trip wholesale.
    pub fn insert(&mut self, trip: Trip) {
        self.trips.insert(trip.id, trip);
    }

    /// Drops a trip from the cache, after deletion.
    pub fn remove(&mut self, trip_id: i64) {
        self.trips.remove(&trip_id);
    }

    #[must_use]
    pub fn contains(&self, trip_id: i64) -> bool {
        self.trips.contains_key(&trip_id)
    }

    #[must_use]
    pub fn trip(&self, trip_id: i64) -> Option<&Trip> {
        self.trips.get(&trip_id)
    }

    /// The places of a cached trip, or `None` when the trip is not cached.
    #[must_use]
    pub fn places(&self, trip_id: i64) -> Option<&[Place]> {
        self.trips.get(&trip_id).map(|t| t.places.as_slice())
    }

    /// Whether the cached trip already holds a place with this provider id.
    #[must_use]
    pub fn has_place(&self, trip_id: i64, place_id: &str) -> bool {
        self.places(trip_id)
            .is_some_and(|places| places.iter().any(|p| p.place_id == place_id))
    }

    /// Merges a freshly attached place into a cached trip.
    pub fn apply_place_attached(&mut self, trip_id: i64, place: Place) {
        if let Some(trip) = self.trips.get_mut(&trip_id) {
            trip.places = reconcile::place_attached(std::mem::take(&mut trip.places), place);
        }
    }

    /// Removes one place (by row id) from a cached trip.
    pub fn apply_place_removed(&mut self, trip_id: i64, place_id: i64) {
        if let Some(trip) = self.trips.get_mut(&trip_id) {
            trip.places = reconcile::place_removed(std::mem::take(&mut trip.places), place_id);
        }
    }

    /// Removes one collaborator from a cached trip.
    pub fn apply_collaborator_removed(&mut self, trip_id: i64, collaborator_id: i64) {
        if let Some(trip) = self.trips.get_mut(&trip_id) {
            if let Some(collaborators) = trip.collaborators.take() {
                trip.collaborators = Some(reconcile::collaborator_removed(
                    collaborators,
                    collaborator_id,
                ));
            }
        }
    }

    /// Replaces a cached trip's name with the server-returned one.
    pub fn apply_trip_renamed(&mut self, trip_id: i64, name: &str) {
        if let Some(trip) = self.trips.remove(&trip_id) {
            self.insert(reconcile::trip_renamed(trip, name));
        }
    }
}
