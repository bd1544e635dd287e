//! Reconciles local view state with the backend's answer to a mutation.
//!
//! The merge functions are pure: previous list in, mutation result in, new
//! list out. [`Reconciler`] drives the four trip mutations end to end,
//! applying the matching merge to the shared [`TripStore`] on success and
//! leaving it untouched on failure. Nothing here refetches; the mutation's
//! own response is the only input.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use tripkit_api::TripApi;
use tripkit_core::{Collaborator, Place, Trip, TripSummary};

use crate::notify::{NavTarget, Notice};
use crate::session::Session;
use crate::store::TripStore;

// ---------------------------------------------------------------------------
// Merge functions
// ---------------------------------------------------------------------------

/// Removes exactly the place whose row id matches, preserving order.
#[must_use]
pub fn place_removed(places: Vec<Place>, place_id: i64) -> Vec<Place> {
    places.into_iter().filter(|p| p.id != place_id).collect()
}

/// Appends the attached place unless its provider id is already present.
/// Keeps provider-id uniqueness within one trip's list.
#[must_use]
pub fn place_attached(mut places: Vec<Place>, place: Place) -> Vec<Place> {
    if places.iter().any(|p| p.place_id == place.place_id) {
        return places;
    }
    places.push(place);
    places
}

/// Removes exactly the collaborator whose id matches, preserving order.
#[must_use]
pub fn collaborator_removed(
    collaborators: Vec<Collaborator>,
    collaborator_id: i64,
) -> Vec<Collaborator> {
    collaborators
        .into_iter()
        .filter(|c| c.id != collaborator_id)
        .collect()
}

/// Replaces the trip's name with the server-returned string. Everything
/// else, places included, stays as it was.
#[must_use]
pub fn trip_renamed(mut trip: Trip, name: &str) -> Trip {
    trip.name = name.to_owned();
    trip
}

/// Removes exactly the trip whose id matches from a summary list.
#[must_use]
pub fn trip_removed(trips: Vec<TripSummary>, trip_id: i64) -> Vec<TripSummary> {
    trips.into_iter().filter(|t| t.id != trip_id).collect()
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ReconcilerEvent {
    Notice(Notice),
    Navigate(NavTarget),
}

/// Drives trip mutations end to end: token check, request, merge.
///
/// Every method reports its outcome through the event channel instead of
/// returning a `Result`; a failed mutation leaves the store exactly as it
/// was and never navigates.
pub struct Reconciler {
    api: Arc<TripApi>,
    session: Arc<Session>,
    store: Arc<Mutex<TripStore>>,
    events: mpsc::UnboundedSender<ReconcilerEvent>,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        api: Arc<TripApi>,
        session: Arc<Session>,
        store: Arc<Mutex<TripStore>>,
    ) -> (Self, mpsc::UnboundedReceiver<ReconcilerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                session,
                store,
                events,
            },
            rx,
        )
    }

    /// Renames a trip, then shows exactly the name the server stored.
    pub async fn rename_trip(&self, trip_id: i64, name: &str) {
        let Some(token) = self.require_token() else {
            return;
        };

        match self.api.rename_trip(&token, trip_id, name).await {
            Ok(updated) => {
                self.store
                    .lock()
                    .await
                    .apply_trip_renamed(trip_id, &updated.name);
                self.emit(ReconcilerEvent::Notice(Notice::success("Trip renamed.")));
            }
            Err(err) => {
                tracing::warn!(trip_id, error = %err, "trip rename failed");
                self.emit(ReconcilerEvent::Notice(Notice::error(
                    err.user_message("Could not rename the trip."),
                )));
            }
        }
    }

    /// Removes one place from a trip and merges the removal locally.
    pub async fn delete_place(&self, trip_id: i64, place_id: i64) {
        let Some(token) = self.require_token() else {
            return;
        };

        match self.api.delete_place(&token, trip_id, place_id).await {
            Ok(()) => {
                self.store
                    .lock()
                    .await
                    .apply_place_removed(trip_id, place_id);
                self.emit(ReconcilerEvent::Notice(Notice::success("Place removed.")));
            }
            Err(err) => {
                tracing::warn!(trip_id, place_id, error = %err, "place removal failed");
                self.emit(ReconcilerEvent::Notice(Notice::error(
                    err.user_message("Could not remove the place."),
                )));
            }
        }
    }

    /// Removes a collaborator from a trip and merges the removal locally.
    pub async fn delete_collaborator(&self, trip_id: i64, collaborator_id: i64) {
        let Some(token) = self.require_token() else {
            return;
        };

        match self
            .api
            .delete_collaborator(&token, trip_id, collaborator_id)
            .await
        {
            Ok(()) => {
                self.store
                    .lock()
                    .await
                    .apply_collaborator_removed(trip_id, collaborator_id);
                self.emit(ReconcilerEvent::Notice(Notice::success(
                    "Collaborator removed.",
                )));
            }
            Err(err) => {
                tracing::warn!(trip_id, collaborator_id, error = %err, "collaborator removal failed");
                self.emit(ReconcilerEvent::Notice(Notice::error(
                    err.user_message("Could not remove the collaborator."),
                )));
            }
        }
    }

    /// Deletes a trip entirely. Success drops it from the store and
    /// navigates to the trips list; failure does neither.
    pub async fn delete_trip(&self, trip_id: i64) {
        let Some(token) = self.require_token() else {
            return;
        };

        match self.api.delete_trip(&token, trip_id).await {
            Ok(()) => {
                self.store.lock().await.remove(trip_id);
                self.emit(ReconcilerEvent::Notice(Notice::success("Trip deleted.")));
                self.emit(ReconcilerEvent::Navigate(NavTarget::Trips));
            }
            Err(err) => {
                tracing::warn!(trip_id, error = %err, "trip deletion failed");
                self.emit(ReconcilerEvent::Notice(Notice::error(
                    err.user_message("Could not delete the trip."),
                )));
            }
        }
    }

    /// The current token, or the auth-required path when there is none:
    /// notice, navigate to login, and no request issued.
    fn require_token(&self) -> Option<String> {
        let token = self.session.token();
        if token.is_none() {
            self.emit(ReconcilerEvent::Notice(Notice::error(
                "You need to be logged in for that.",
            )));
            self.emit(ReconcilerEvent::Navigate(NavTarget::Login));
        }
        token
    }

    fn emit(&self, event: ReconcilerEvent) {
        self.events.send(event).ok();
    }
}


#[cfg(test)]
#[path = "reconcile_test.rs"]
mod reconciler_tests;
