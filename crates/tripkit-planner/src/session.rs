//! Auth session state machine.
//!
//! One [`Session`] owns the relationship between the stored bearer token
//! and what the app believes about the signed-in user. Startup calls
//! [`Session::restore`] to re-validate a persisted token; login, register,
//! and logout move the state from there. Every transition is announced on
//! the event channel so a frontend can render the current state without
//! polling.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex};

use tripkit_api::{ApiError, AuthSession, TripApi};
use tripkit_core::AuthUser;

use crate::notify::{NavTarget, Notice};

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Startup state: [`Session::restore`] has not looked at the store yet.
    Unknown,
    /// No usable token. The login screen is the only way forward.
    Anonymous,
    /// A stored token is being checked against the backend.
    Verifying,
    /// The backend confirmed the token and returned its user.
    Authenticated(AuthUser),
}

/// Token persistence the session reads and writes through.
///
/// The engine never caches the token elsewhere; [`Session::token`] always
/// reflects the store, so an external wipe takes effect on the next call.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// In-process [`TokenStore`]. The CLI default, and what tests use.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: StdMutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_owned());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(AuthState),
    Notice(Notice),
    Navigate(NavTarget),
}

/// Drives authentication against the trip backend.
///
/// Methods report outcomes through the event channel instead of returning
/// `Result`; a failed login leaves the session [`AuthState::Anonymous`]
/// with the token store empty.
pub struct Session {
    api: Arc<TripApi>,
    tokens: Arc<dyn TokenStore>,
    state: Mutex<AuthState>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl Session {
    #[must_use]
    pub fn new(
        api: Arc<TripApi>,
        tokens: Arc<dyn TokenStore>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                tokens,
                state: Mutex::new(AuthState::Unknown),
                events,
            },
            rx,
        )
    }

    /// Current state, cloned out of the lock.
    pub async fn state(&self) -> AuthState {
        self.state.lock().await.clone()
    }

    /// The stored bearer token, straight from the [`TokenStore`].
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    /// Re-validates a persisted token on startup.
    ///
    /// No token means staying [`AuthState::Anonymous`] quietly. A token is
    /// checked against the backend through [`AuthState::Verifying`]; if it
    /// is rejected the store is wiped and the user is sent to the login
    /// screen.
    pub async fn restore(&self) {
        let Some(token) = self.tokens.get() else {
            self.set_state(AuthState::Anonymous).await;
            return;
        };

        self.set_state(AuthState::Verifying).await;
        match self.api.verify_token(&token).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "session restored");
                self.set_state(AuthState::Authenticated(user)).await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored token rejected");
                self.tokens.clear();
                self.emit(SessionEvent::Notice(Notice::error(
                    "Your session expired. Please sign in again.",
                )));
                self.set_state(AuthState::Anonymous).await;
                self.emit(SessionEvent::Navigate(NavTarget::Login));
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) {
        match self.api.login(email, password).await {
            Ok(session) => self.accept(session, "Welcome back").await,
            Err(err) => self.reject(&err, "Could not sign you in.").await,
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) {
        match self.api.register(name, email, password).await {
            Ok(session) => self.accept(session, "Welcome").await,
            Err(err) => self.reject(&err, "Could not create your account.").await,
        }
    }

    /// Drops the token and returns to the login screen. Purely local; the
    /// backend keeps no session state worth revoking.
    pub async fn logout(&self) {
        self.tokens.clear();
        self.set_state(AuthState::Anonymous).await;
        self.emit(SessionEvent::Notice(Notice::info("Signed out.")));
        self.emit(SessionEvent::Navigate(NavTarget::Login));
    }

    async fn accept(&self, session: AuthSession, greeting: &str) {
        self.tokens.set(&session.token);
        tracing::info!(user_id = session.user.id, "signed in");
        let name = session.user.display_name().to_owned();
        self.emit(SessionEvent::Notice(Notice::success(format!(
            "{greeting}, {name}!"
        ))));
        self.set_state(AuthState::Authenticated(session.user)).await;
        self.emit(SessionEvent::Navigate(NavTarget::Home));
    }

    async fn reject(&self, err: &ApiError, fallback: &str) {
        tracing::warn!(error = %err, "sign-in failed");
        self.tokens.clear();
        self.emit(SessionEvent::Notice(Notice::error(
            err.user_message(fallback),
        )));
        self.set_state(AuthState::Anonymous).await;
    }

    async fn set_state(&self, next: AuthState) {
        *self.state.lock().await = next.clone();
        self.emit(SessionEvent::StateChanged(next));
    }

    fn emit(&self, event: SessionEvent) {
        self.events.send(event).ok();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
