//! Typed client for the places/geocoding provider.
//!
//! The provider speaks the legacy Google-Maps-style JSON endpoints: every
//! response body carries a `status` string where `OK` and `ZERO_RESULTS`
//! mean success and anything else is a provider-level error, independent of
//! the HTTP status.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use session::SessionToken;
pub use types::{PlaceDetails, Suggestion};
