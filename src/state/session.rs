//! Authentication session store.
//!
//! ARCHITECTURE
//! ============
//! One `SessionStore` is built at startup and shared (`Arc`) for the life of
//! the process; it is reset in place, never torn down. Every mutation writes
//! the persisted fragment `{token, is_authenticated}` to durable storage;
//! `user` and `error` are never persisted and start empty on each load.
//!
//! Concurrent actions are last-write-wins: a `logout` that lands while a
//! `fetch_user` is in flight can be overwritten when the fetch completes.
//!
//! FAILURE PATHS
//! =============
//! - credential rejection (login/register): surfaced through `error`, the
//!   call returns the error so the form can react.
//! - token rejected by `/auth/me`: silent reset to anonymous, no `error`.
//! - any other failure of `/auth/me` (transport, 5xx, an unreadable body):
//!   the token is kept so an unreachable or misbehaving backend at startup
//!   does not log the user out.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::auth::AuthBackend;
use crate::net::types::{User, UserCreate};
use crate::storage::{SESSION_KEY, Storage, TOKEN_KEY};

pub const LOGIN_FALLBACK_MESSAGE: &str = "Authorization error";
pub const REGISTER_FALLBACK_MESSAGE: &str = "Registration error";

/// Current authenticated identity as seen by the client.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    /// Populated lazily after the token is acquired.
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    /// Last credential error, for display until cleared.
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    /// Anonymous, annotated with a credential error.
    AuthFailed,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.error.is_some() {
            SessionPhase::AuthFailed
        } else {
            SessionPhase::Anonymous
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

/// Subset of [`Session`] that survives a restart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct PersistedSession {
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self { token: session.token.clone(), is_authenticated: session.is_authenticated }
    }
}

/// How a [`SessionStore::fetch_user`] call resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No token anywhere; nothing was requested.
    Anonymous,
    Authenticated,
    /// The backend rejected the token; the session was reset.
    Expired,
    /// The backend could not be asked; the token was kept.
    Deferred,
}

pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn Storage>,
    backend: Arc<dyn AuthBackend>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &self.snapshot()).finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store, hydrating the persisted fragment from `storage`.
    pub fn new(storage: Arc<dyn Storage>, backend: Arc<dyn AuthBackend>) -> Self {
        let persisted = storage
            .get_item(SESSION_KEY)
            .and_then(|raw| match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(fragment) => Some(fragment),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable persisted session");
                    None
                }
            })
            .unwrap_or_default();
        let session = Session {
            token: persisted.token,
            is_authenticated: persisted.is_authenticated,
            ..Session::default()
        };
        Self { state: RwLock::new(session), storage, backend }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.snapshot().phase()
    }

    /// Apply `f` to the session and persist the resulting fragment.
    fn update<F: FnOnce(&mut Session)>(&self, f: F) {
        let fragment = {
            let mut session = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut session);
            PersistedSession::from(&*session)
        };
        let result = serde_json::to_string(&fragment)
            .map_err(|e| crate::error::StorageError::Corrupt(e.to_string()))
            .and_then(|raw| self.storage.set_item(SESSION_KEY, &raw));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist session fragment");
        }
    }

    fn forget_token(&self) {
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted token");
        }
    }

    fn reset_to_anonymous(&self) {
        self.forget_token();
        self.update(|s| {
            s.user = None;
            s.token = None;
            s.is_authenticated = false;
            s.is_loading = false;
        });
    }

    /// Exchange credentials for a token, then load the user.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection after recording its detail (or
    /// [`LOGIN_FALLBACK_MESSAGE`]) in `error`.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let result = self.exchange_credentials(username, password).await;
        if let Err(err) = &result {
            self.record_failure(err, LOGIN_FALLBACK_MESSAGE);
        }
        result
    }

    async fn exchange_credentials(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let token = self.backend.login(username, password).await?.access_token;
        self.storage.set_item(TOKEN_KEY, &token)?;
        self.update(|s| {
            s.token = Some(token);
            s.is_authenticated = true;
        });
        tracing::info!(%username, "login accepted");
        self.fetch_user().await;
        Ok(())
    }

    /// Create an account, then log straight into it.
    ///
    /// # Errors
    ///
    /// Returns the registration or follow-up login failure after recording its
    /// detail (or [`REGISTER_FALLBACK_MESSAGE`]) in `error`.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let result = self.register_then_login(username, email, password).await;
        if let Err(err) = &result {
            self.record_failure(err, REGISTER_FALLBACK_MESSAGE);
        }
        result
    }

    async fn register_then_login(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let payload = UserCreate { username: username.to_owned(), email: email.to_owned(), password: password.to_owned() };
        self.backend.register(&payload).await?;
        tracing::info!(%username, "account registered");
        self.login(username, password).await
    }

    fn record_failure(&self, err: &ApiError, fallback: &str) {
        let message = err.detail().unwrap_or(fallback).to_owned();
        tracing::info!(error = %err, "credential request failed");
        self.update(|s| {
            s.error = Some(message);
            s.is_loading = false;
        });
    }

    /// Drop the token and return to the anonymous state. Idempotent.
    ///
    /// `is_loading` is left as-is.
    pub fn logout(&self) {
        self.forget_token();
        self.update(|s| {
            s.user = None;
            s.token = None;
            s.is_authenticated = false;
            s.error = None;
        });
        tracing::info!("session logged out");
    }

    /// Resolve the user behind the current token.
    ///
    /// The in-memory token is preferred over the persisted one. Without either
    /// this is a no-op that leaves the session anonymous.
    pub async fn fetch_user(&self) -> FetchOutcome {
        let token = self
            .snapshot()
            .token
            .or_else(|| self.storage.get_item(TOKEN_KEY))
            .filter(|t| !t.is_empty());
        if token.is_none() {
            self.update(|s| s.is_loading = false);
            return FetchOutcome::Anonymous;
        }

        self.update(|s| s.is_loading = true);
        match self.backend.current_user().await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "session user loaded");
                self.update(|s| {
                    s.user = Some(user);
                    s.is_authenticated = true;
                    s.is_loading = false;
                });
                FetchOutcome::Authenticated
            }
            Err(err) if err.is_client_error() => {
                tracing::info!(error = %err, "session token rejected; resetting");
                self.reset_to_anonymous();
                FetchOutcome::Expired
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not verify session; keeping token");
                self.update(|s| s.is_loading = false);
                FetchOutcome::Deferred
            }
        }
    }

    /// React to server-side invalidation detected elsewhere (a 401 on any call).
    ///
    /// Same reset as an expired `fetch_user`: `error` is left alone.
    pub fn invalidate(&self) {
        tracing::info!("session invalidated by backend");
        self.reset_to_anonymous();
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
