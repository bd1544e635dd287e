//! Typed client for the trip backend REST API.
//!
//! [`TripApi`] covers authentication, trip CRUD, place attachment, and
//! collaborator management. Endpoint groups live in their own modules
//! (`users`, `trips`); the request machinery and error-body handling live in
//! [`client`].

pub mod client;
pub mod error;
pub mod types;

mod trips;
mod users;

pub use client::TripApi;
pub use error::ApiError;
pub use types::{AcceptedInvite, AuthSession, InviteLink, NewTrip, PlacePhoto};
