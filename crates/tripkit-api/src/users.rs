//! Authentication endpoints for the trip backend client.

use tripkit_core::AuthUser;

use crate::client::TripApi;
use crate::error::ApiError;
use crate::types::{AuthSession, LoginRequest, RegisterRequest};

impl TripApi {
    /// Authenticates with email and password, returning the user and a
    /// bearer token.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Api`] with the backend's message (spelled `erro` on this
    ///   route) on rejected credentials.
    /// - [`ApiError::Http`] / [`ApiError::Deserialize`] on transport or shape
    ///   failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let url = self.endpoint("users/login")?;
        let request = self.client.post(url).json(&LoginRequest { email, password });
        Self::request_json(request, "login").await
    }

    /// Registers a new account, returning the user and a bearer token.
    ///
    /// # Errors
    ///
    /// Same surface as [`TripApi::login`].
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let url = self.endpoint("users")?;
        let request = self.client.post(url).json(&RegisterRequest {
            name,
            email,
            password,
        });
        Self::request_json(request, "register").await
    }

    /// Validates a stored token against the backend, returning the user it
    /// belongs to.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] when the token is expired or invalid.
    /// - [`ApiError::Http`] / [`ApiError::Deserialize`] on transport or shape
    ///   failures.
    pub async fn verify_token(&self, token: &str) -> Result<AuthUser, ApiError> {
        let url = self.endpoint("users/verify-token")?;
        let request = self.client.get(url).bearer_auth(token);
        Self::request_json(request, "verify_token").await
    }
}
