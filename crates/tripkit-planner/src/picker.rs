//! Map picker: click a marker, see the place, attach it to a trip.
//!
//! The flow is a small state machine. A click on a marked place drops a
//! pin immediately ([`Selection::Pending`]) and fetches details in the
//! background; opening the trip menu lists the user's trips; choosing one
//! runs a duplicate check against the shared [`TripStore`] before any
//! attachment request goes out. A click elsewhere, or on the map
//! background, resets everything.
//!
//! The generation counter ties async completions to the selection they
//! belong to: every click or clear bumps it, and a details fetch or menu
//! load that finishes under an old generation is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use tripkit_api::{ApiError, TripApi};
use tripkit_core::{Coordinates, TripSummary};
use tripkit_places::{PlacesClient, SessionToken};

use crate::notify::{NavTarget, Notice};
use crate::session::Session;
use crate::store::TripStore;

/// A tap on the map. `place_id` is present when it landed on a place
/// marker rather than bare ground.
#[derive(Debug, Clone, PartialEq)]
pub struct MapClick {
    pub position: Coordinates,
    pub place_id: Option<String>,
}

/// What the pin currently points at.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Idle,
    /// A marker was clicked; details are still on their way. The position
    /// is already usable for the pin.
    Pending {
        place_id: String,
        position: Coordinates,
    },
    Resolved(ResolvedPlace),
}

/// Details for the selected place, ready for an info card.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub place_id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub position: Coordinates,
    pub rating: Option<f64>,
    pub photo_url: Option<String>,
}

/// The attach-to-trip menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripMenu {
    Closed,
    Loading,
    Open(Vec<TripSummary>),
    /// The user must sign in before trips can be listed.
    AuthRequired,
}

#[derive(Debug, Clone)]
pub enum PickerEvent {
    SelectionChanged(Selection),
    MenuChanged(TripMenu),
    Notice(Notice),
    Navigate(NavTarget),
}

struct PickerState {
    selection: Selection,
    menu: TripMenu,
    /// Provider billing session covering this selection's details fetch.
    provider_session: SessionToken,
}

struct PickerInner {
    api: Arc<TripApi>,
    places: Arc<PlacesClient>,
    session: Arc<Session>,
    store: Arc<Mutex<TripStore>>,
    /// Bumped on every click or clear; async completions under an older
    /// value are discarded.
    generation: AtomicU64,
    state: Mutex<PickerState>,
    events: mpsc::UnboundedSender<PickerEvent>,
}

/// Drives the click-to-attach flow. Cloning the handle shares the state.
#[derive(Clone)]
pub struct MapPicker {
    inner: Arc<PickerInner>,
}

impl MapPicker {
    #[must_use]
    pub fn new(
        api: Arc<TripApi>,
        places: Arc<PlacesClient>,
        session: Arc<Session>,
        store: Arc<Mutex<TripStore>>,
    ) -> (Self, mpsc::UnboundedReceiver<PickerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                inner: Arc::new(PickerInner {
                    api,
                    places,
                    session,
                    store,
                    generation: AtomicU64::new(0),
                    state: Mutex::new(PickerState {
                        selection: Selection::Idle,
                        menu: TripMenu::Closed,
                        provider_session: SessionToken::new(),
                    }),
                    events,
                }),
            },
            rx,
        )
    }

    /// Handles a map tap.
    ///
    /// On a marker: pin goes [`Selection::Pending`] right away, the menu
    /// closes, and a details fetch starts under a fresh provider session.
    /// On bare ground: same as [`MapPicker::clear`].
    pub async fn click(&self, click: MapClick) {
        let Some(place_id) = click.place_id else {
            self.clear().await;
            return;
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let pending = Selection::Pending {
            place_id: place_id.clone(),
            position: click.position,
        };
        {
            let mut state = self.inner.state.lock().await;
            state.selection = pending.clone();
            state.menu = TripMenu::Closed;
            state.provider_session = SessionToken::new();
        }
        self.emit(PickerEvent::SelectionChanged(pending));
        self.emit(PickerEvent::MenuChanged(TripMenu::Closed));

        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.resolve_details(generation, place_id).await;
        });
    }

    /// Drops the pin and closes the menu.
    pub async fn clear(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.inner.state.lock().await;
            state.selection = Selection::Idle;
            state.menu = TripMenu::Closed;
        }
        self.emit(PickerEvent::SelectionChanged(Selection::Idle));
        self.emit(PickerEvent::MenuChanged(TripMenu::Closed));
    }

    /// Opens the attach-to-trip menu for the current selection.
    ///
    /// Does nothing without a selection or while the menu is already
    /// loading or open. Without a token the menu shows
    /// [`TripMenu::AuthRequired`] and no request is made.
    pub async fn open_menu(&self) {
        {
            let state = self.inner.state.lock().await;
            if matches!(state.selection, Selection::Idle) {
                return;
            }
            if matches!(state.menu, TripMenu::Loading | TripMenu::Open(_)) {
                return;
            }
        }

        let Some(token) = self.inner.session.token() else {
            self.set_menu(TripMenu::AuthRequired).await;
            return;
        };

        let generation = self.inner.generation.load(Ordering::SeqCst);
        self.set_menu(TripMenu::Loading).await;

        match self.inner.api.my_trips(&token).await {
            Ok(trips) => {
                self.set_menu_if_current(generation, TripMenu::Open(trips))
                    .await;
            }
            Err(ApiError::Unauthorized { .. }) => {
                self.set_menu_if_current(generation, TripMenu::AuthRequired)
                    .await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "trip list fetch failed");
                self.emit(PickerEvent::Notice(Notice::error(
                    err.user_message("Could not load your trips."),
                )));
                self.set_menu_if_current(generation, TripMenu::Closed).await;
            }
        }
    }

    /// Attaches the selected place to `trip_id`, checking for a duplicate
    /// first.
    ///
    /// The trip's place list is taken from the store, fetched once if
    /// missing. A duplicate raises an info notice and no attachment request
    /// is made; the pin stays so the user can pick another trip. A
    /// successful attachment merges the new place into the store, resets
    /// the picker, and navigates to the trip's place list.
    pub async fn choose_trip(&self, trip_id: i64) {
        let (place_id, generation) = {
            let state = self.inner.state.lock().await;
            let place_id = match &state.selection {
                Selection::Idle => return,
                Selection::Pending { place_id, .. } => place_id.clone(),
                Selection::Resolved(place) => place.place_id.clone(),
            };
            (place_id, self.inner.generation.load(Ordering::SeqCst))
        };

        let Some(token) = self.inner.session.token() else {
            self.clear().await;
            self.emit(PickerEvent::Navigate(NavTarget::Login));
            return;
        };

        if !self.inner.store.lock().await.contains(trip_id) {
            match self.inner.api.trip_places(&token, trip_id).await {
                Ok(trip) => self.inner.store.lock().await.insert(trip),
                Err(err) => {
                    tracing::warn!(trip_id, error = %err, "trip places fetch failed");
                    self.emit(PickerEvent::Notice(Notice::error(
                        err.user_message("Could not check the trip's places."),
                    )));
                    return;
                }
            }
        }

        if self.inner.store.lock().await.has_place(trip_id, &place_id) {
            self.emit(PickerEvent::Notice(Notice::info(
                "This place is already in that trip.",
            )));
            self.set_menu(TripMenu::Closed).await;
            return;
        }

        match self.inner.api.attach_place(&token, &place_id, trip_id).await {
            Ok(place) => {
                self.inner
                    .store
                    .lock()
                    .await
                    .apply_place_attached(trip_id, place);

                // Reset the pin only if this selection is still the current
                // one; a newer click keeps its own state.
                let mut state = self.inner.state.lock().await;
                let current = self.inner.generation.load(Ordering::SeqCst) == generation;
                if current {
                    state.selection = Selection::Idle;
                    state.menu = TripMenu::Closed;
                }
                drop(state);
                if current {
                    self.emit(PickerEvent::SelectionChanged(Selection::Idle));
                    self.emit(PickerEvent::MenuChanged(TripMenu::Closed));
                }

                self.emit(PickerEvent::Notice(Notice::success(
                    "Place added to the trip.",
                )));
                self.emit(PickerEvent::Navigate(NavTarget::TripPlaces(trip_id)));
            }
            Err(err) => {
                tracing::warn!(trip_id, place_id = %place_id, error = %err, "place attachment failed");
                self.emit(PickerEvent::Notice(Notice::error(
                    err.user_message("Could not add the place to the trip."),
                )));
            }
        }
    }

    /// The current selection, cloned out of the lock.
    pub async fn selection(&self) -> Selection {
        self.inner.state.lock().await.selection.clone()
    }

    /// The current menu state, cloned out of the lock.
    pub async fn menu(&self) -> TripMenu {
        self.inner.state.lock().await.menu.clone()
    }

    async fn set_menu(&self, menu: TripMenu) {
        self.inner.state.lock().await.menu = menu.clone();
        self.emit(PickerEvent::MenuChanged(menu));
    }

    async fn set_menu_if_current(&self, generation: u64, menu: TripMenu) {
        let mut state = self.inner.state.lock().await;
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        state.menu = menu.clone();
        drop(state);
        self.emit(PickerEvent::MenuChanged(menu));
    }

    fn emit(&self, event: PickerEvent) {
        self.inner.events.send(event).ok();
    }
}

impl PickerInner {
    /// Resolves details for the clicked place and applies them if the
    /// selection has not moved on. A failed fetch leaves the selection
    /// pending; the pin position is still usable.
    async fn resolve_details(self: Arc<Self>, generation: u64, place_id: String) {
        let provider_session = self.state.lock().await.provider_session.clone();
        let details = match self.places.place_details(&place_id, &provider_session).await {
            Ok(details) => details,
            Err(err) => {
                tracing::warn!(place_id = %place_id, error = %err, "place details fetch failed");
                return;
            }
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }

        // Best effort: a card without a photo is still a card.
        let photo_url = match details.photos.first() {
            Some(photo) => match self.api.place_photo_url(&photo.photo_reference).await {
                Ok(photo) => Some(photo.url),
                Err(err) => {
                    tracing::debug!(place_id = %place_id, error = %err, "photo lookup failed");
                    None
                }
            },
            None => None,
        };

        let resolved = ResolvedPlace {
            place_id: details.place_id,
            name: details.name,
            address: details.formatted_address,
            position: details.geometry.location,
            rating: details.rating,
            photo_url,
        };

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        state.selection = Selection::Resolved(resolved.clone());
        drop(state);
        self.events
            .send(PickerEvent::SelectionChanged(Selection::Resolved(resolved)))
            .ok();
    }
}

#[cfg(test)]
#[path = "picker_test.rs"]
mod tests;
