//! Top-level coordinator.
//!
//! ARCHITECTURE
//! ============
//! `App` is built once at startup and owns every long-lived piece: durable
//! storage, the HTTP client, the session store, and the router. The client
//! only *reports* a rejected bearer token (`SessionSignal::Unauthorized`);
//! `App::process_signals` is where that turns into a session reset and a
//! redirect to the login screen. Views call `process_signals` after any
//! backend interaction so the reaction happens regardless of which call site
//! triggered the 401.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::guard::GuardDecision;
use crate::net::client::{ApiClient, SessionSignal};
use crate::router::{Location, Router};
use crate::state::session::{FetchOutcome, SessionStore};
use crate::storage::{FileStorage, Storage};

pub struct App {
    config: ClientConfig,
    client: ApiClient,
    session: Arc<SessionStore>,
    router: Mutex<Router>,
    signals: Mutex<mpsc::UnboundedReceiver<SessionSignal>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("config", &self.config).field("session", &self.session).finish_non_exhaustive()
    }
}

impl App {
    /// Wire the client, session store, and router over `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let (client, signals) = ApiClient::new(&config, storage.clone())?;
        let session = Arc::new(SessionStore::new(storage, Arc::new(client.clone())));
        Ok(Self { config, client, session, router: Mutex::new(Router::default()), signals: Mutex::new(signals) })
    }

    /// Like [`App::new`] with file-backed storage at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the storage file is unreadable.
    pub fn open(config: ClientConfig) -> Result<Self, ApiError> {
        let storage = FileStorage::open(&config.storage_path)?;
        Self::new(config, Arc::new(storage))
    }

    /// Startup hook: try to promote a persisted token to a verified session.
    pub async fn start(&self) -> FetchOutcome {
        let outcome = self.session.fetch_user().await;
        tracing::debug!(?outcome, "startup session check");
        self.process_signals();
        outcome
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn router_mut(&self) -> MutexGuard<'_, Router> {
        self.router.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point-in-time copy of the router.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router_mut().clone()
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.router_mut().current().clone()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Location> {
        self.router_mut().history().to_vec()
    }

    /// Guarded navigation against the current session.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        let session = self.session.snapshot();
        self.router_mut().navigate(path, &session)
    }

    /// Apply every pending transport signal. Returns how many were handled.
    pub fn process_signals(&self) -> usize {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let mut handled = 0;
        while let Ok(signal) = signals.try_recv() {
            match signal {
                SessionSignal::Unauthorized { path } => {
                    tracing::warn!(%path, "backend rejected session; logging out");
                    self.session.invalidate();
                    let location = self.router_mut().redirect_to_login().clone();
                    tracing::debug!(to = %location.path, from = ?location.from, "redirected after invalidation");
                }
            }
            handled += 1;
        }
        handled
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
