//! Controllers for the trip-planning workflow: auth session, debounced place
//! search, the map picker's click-to-attach flow, and the mutation
//! reconciler over a shared trip store.
//!
//! Everything here is headless. Controllers keep their state behind async
//! locks, talk to the backend and places provider through the typed clients,
//! and report outcomes over `tokio::sync::mpsc` event channels that a
//! rendering layer drains. No controller method returns an error to the
//! caller; failures become [`notify::Notice`] events.

pub mod notify;
pub mod picker;
pub mod reconcile;
pub mod search;
pub mod session;
pub mod store;

pub use notify::{NavTarget, Notice, NoticeKind};
pub use picker::{MapClick, MapPicker, PickerEvent, ResolvedPlace, Selection, TripMenu};
pub use reconcile::{Reconciler, ReconcilerEvent};
pub use search::{PickedPlace, PlaceSearch, SearchUpdate};
pub use session::{AuthState, MemoryTokenStore, Session, SessionEvent, TokenStore};
pub use store::TripStore;
