//! Debounced place autocomplete.
//!
//! [`PlaceSearch`] sits between a text field and the places provider. Each
//! keystroke bumps a generation counter and schedules a fetch after the
//! quiet window; a task that wakes to find the counter moved on simply
//! drops out, so only the latest input ever reaches the provider, and a
//! slow response for an old input can never overwrite a newer list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use tripkit_core::Coordinates;
use tripkit_places::{PlacesClient, SessionToken, Suggestion};

/// A suggestion the user chose, geocoded and ready to drop a pin on.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedPlace {
    pub address: String,
    pub place_id: String,
    pub position: Coordinates,
}

#[derive(Debug, Clone)]
pub enum SearchUpdate {
    /// A fresh suggestion list for the current input.
    Suggestions(Vec<Suggestion>),
    /// The dropdown should close and forget its list.
    Cleared,
    /// A chosen suggestion, resolved to coordinates.
    Picked(PickedPlace),
}

struct SearchState {
    suggestions: Vec<Suggestion>,
    session: SessionToken,
    /// Swallows the one input echo a frontend sends when it writes the
    /// chosen description back into the text field.
    suppress_next: bool,
}

struct SearchInner {
    places: Arc<PlacesClient>,
    debounce: Duration,
    /// Bumped on every input; a task that finds it moved is stale.
    generation: AtomicU64,
    state: Mutex<SearchState>,
    events: mpsc::UnboundedSender<SearchUpdate>,
}

/// Debounced autocomplete over the places provider.
///
/// Cloning the handle shares the same state; spawned fetches hold their own
/// clone, so dropping the original does not cancel them.
#[derive(Clone)]
pub struct PlaceSearch {
    inner: Arc<SearchInner>,
}

impl PlaceSearch {
    #[must_use]
    pub fn new(
        places: Arc<PlacesClient>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchUpdate>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                inner: Arc::new(SearchInner {
                    places,
                    debounce,
                    generation: AtomicU64::new(0),
                    state: Mutex::new(SearchState {
                        suggestions: Vec::new(),
                        session: SessionToken::new(),
                        suppress_next: false,
                    }),
                    events,
                }),
            },
            rx,
        )
    }

    /// Feeds the current text-field content in.
    ///
    /// Empty input clears the suggestion list at once. Anything else waits
    /// out the quiet window before asking the provider, and is cancelled by
    /// the next call.
    pub async fn input(&self, text: &str) {
        {
            let mut state = self.inner.state.lock().await;
            if state.suppress_next {
                state.suppress_next = false;
                return;
            }
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let trimmed = text.trim().to_owned();

        if trimmed.is_empty() {
            self.inner.state.lock().await.suggestions.clear();
            self.emit(SearchUpdate::Cleared);
            return;
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            let session = inner.state.lock().await.session.clone();
            let suggestions = match inner.places.autocomplete(&trimmed, &session).await {
                Ok(suggestions) => suggestions,
                Err(err) => {
                    tracing::debug!(input = %trimmed, error = %err, "autocomplete failed");
                    Vec::new()
                }
            };

            // Re-check under the lock: a newer input may have landed while
            // the request was in flight.
            let mut state = inner.state.lock().await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            state.suggestions.clone_from(&suggestions);
            drop(state);
            inner.events.send(SearchUpdate::Suggestions(suggestions)).ok();
        });
    }

    /// Takes one suggestion as the answer: closes the dropdown, geocodes the
    /// description, and reports the pin position.
    ///
    /// A geocoding failure is logged and the pick dropped; the next
    /// keystroke starts over. The provider session token is rotated here so
    /// the next search bills as its own session.
    pub async fn select(&self, suggestion: &Suggestion) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.inner.state.lock().await;
            state.suggestions.clear();
            state.suppress_next = true;
            state.session = SessionToken::new();
        }
        self.emit(SearchUpdate::Cleared);

        match self.inner.places.geocode(&suggestion.description).await {
            Ok(position) => {
                self.emit(SearchUpdate::Picked(PickedPlace {
                    address: suggestion.description.clone(),
                    place_id: suggestion.place_id.clone(),
                    position,
                }));
            }
            Err(err) => {
                tracing::warn!(
                    description = %suggestion.description,
                    error = %err,
                    "geocode for picked suggestion failed"
                );
            }
        }
    }

    /// The suggestion list as of the last applied fetch.
    pub async fn suggestions(&self) -> Vec<Suggestion> {
        self.inner.state.lock().await.suggestions.clone()
    }

    fn emit(&self, update: SearchUpdate) {
        self.inner.events.send(update).ok();
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
