//! Configured HTTP transport for every backend call.
//!
//! ARCHITECTURE
//! ============
//! Two cross-cutting policies live here so call sites never repeat them:
//! - request augmentation: the bearer token is read from durable storage (not
//!   from the in-memory session, which may not be hydrated yet) and attached
//!   to every outgoing request;
//! - response interception: a 401 on a request that carried a bearer token
//!   means the backend invalidated the session. The client emits
//!   [`SessionSignal::Unauthorized`] and returns the error. It does not touch
//!   storage or navigation itself; the coordinator in `app` owns that reaction.
//!
//! No retries and no token refresh: every failure is terminal for its call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::{Storage, TOKEN_KEY};

/// Out-of-band events raised by the transport for the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    /// A bearer-authenticated call to `path` was answered with 401.
    Unauthorized { path: String },
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
    signals: mpsc::UnboundedSender<SessionSignal>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build the client and the receiving half of its signal channel.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the reqwest client cannot be built.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionSignal>), ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Self { http, base_url: config.api_url.trim_end_matches('/').to_owned(), storage, signals: tx };
        Ok((client, rx))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start a request with the persisted bearer token attached, if any.
    fn build(&self, method: Method, path: &str) -> (RequestBuilder, bool) {
        let builder = self.http.request(method, self.url(path));
        match self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty()) {
            Some(token) => (builder.bearer_auth(token), true),
            None => (builder, false),
        }
    }

    /// Send, then apply the response policy. Returns the raw success body.
    async fn execute(&self, path: &str, builder: RequestBuilder, bearer: bool) -> Result<String, ApiError> {
        tracing::debug!(%path, bearer, "backend request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let err = ApiError::from_response(status.as_u16(), &body);
        if matches!(err, ApiError::Unauthorized { .. }) && bearer {
            tracing::warn!(%path, "bearer token rejected; signalling session invalidation");
            // Receiver gone means the coordinator is shutting down.
            let _ = self.signals.send(SessionSignal::Unauthorized { path: path.to_owned() });
        } else {
            tracing::debug!(%path, status = status.as_u16(), "backend error");
        }
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
        bearer: bool,
    ) -> Result<T, ApiError> {
        let body = self.execute(path, builder, bearer).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (builder, bearer) = self.build(Method::GET, path);
        self.execute_json(path, builder, bearer).await
    }

    pub(crate) async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let (builder, bearer) = self.build(Method::GET, path);
        self.execute_json(path, builder.query(query), bearer).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (builder, bearer) = self.build(Method::POST, path);
        self.execute_json(path, builder.json(body), bearer).await
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> Result<T, ApiError> {
        let (builder, bearer) = self.build(Method::POST, path);
        self.execute_json(path, builder.form(form), bearer).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (builder, bearer) = self.build(Method::PUT, path);
        self.execute_json(path, builder.json(body), bearer).await
    }

    /// `PUT` with no request body (admin state transitions).
    pub(crate) async fn put_bare<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (builder, bearer) = self.build(Method::PUT, path);
        self.execute_json(path, builder, bearer).await
    }

    /// `PUT` whose response body is irrelevant.
    pub(crate) async fn put_discard<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let (builder, bearer) = self.build(Method::PUT, path);
        self.execute(path, builder.json(body), bearer).await.map(drop)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let (builder, bearer) = self.build(Method::DELETE, path);
        self.execute(path, builder, bearer).await.map(drop)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
