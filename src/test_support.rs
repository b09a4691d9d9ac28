//! In-process mock of the tour-booking backend for HTTP-level tests.
//!
//! Serves the subset of endpoints the tests exercise on `127.0.0.1:0` and
//! records the auth-relevant headers of every request it sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::ClientConfig;

#[derive(Clone, Debug)]
pub(crate) struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub query: Option<String>,
}

#[derive(Default)]
pub(crate) struct BackendState {
    accounts: Mutex<HashMap<String, (String, Value)>>,
    tokens: Mutex<HashMap<String, String>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl BackendState {
    fn record(&self, path: &str, query: Option<String>, headers: &HeaderMap) {
        let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        self.seen.lock().unwrap().push(SeenRequest {
            path: path.to_owned(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            query,
        });
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<Value, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);
        let username = token.and_then(|t| self.tokens.lock().unwrap().get(&t).cloned());
        match username {
            Some(name) => Ok(self.accounts.lock().unwrap()[&name].1.clone()),
            None => Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")),
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn user_json(id: usize, username: &str, email: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": email,
        "is_active": true,
        "is_admin": is_admin,
        "created_at": "2025-01-01T00:00:00"
    })
}

pub(crate) fn tour_json(id: i64, city: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Tour {id}"),
        "agency": "Volga Travel",
        "description": null,
        "start_date": "2025-06-01T00:00:00",
        "end_date": "2025-06-08T00:00:00",
        "price": 45000.0,
        "city": city,
        "payment_terms": null
    })
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Arc<BackendState>>, headers: HeaderMap, Json(body): Json<RegisterBody>) -> Response {
    state.record("/auth/register", None, &headers);
    let mut accounts = state.accounts.lock().unwrap();
    if accounts.contains_key(&body.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    let user = user_json(accounts.len() + 1, &body.username, &body.email, false);
    accounts.insert(body.username, (body.password, user.clone()));
    (StatusCode::CREATED, Json(user)).into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<BackendState>>, headers: HeaderMap, Form(form): Form<LoginForm>) -> Response {
    state.record("/auth/login", None, &headers);
    let ok = state
        .accounts
        .lock()
        .unwrap()
        .get(&form.username)
        .is_some_and(|(password, _)| *password == form.password);
    if !ok {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }
    let token = format!("tok-{}", form.username);
    state.tokens.lock().unwrap().insert(token.clone(), form.username);
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

async fn me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("/auth/me", None, &headers);
    match state.authorize(&headers) {
        Ok(user) => Json(user).into_response(),
        Err(resp) => resp,
    }
}

#[derive(Deserialize)]
struct TourFilter {
    city: Option<String>,
    limit: Option<usize>,
}

async fn list_tours(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(filter): Query<TourFilter>,
) -> Response {
    let query = filter.city.as_ref().map(|c| format!("city={c}"));
    state.record("/tours/", query, &headers);
    let tours: Vec<Value> = [(7, "Yaroslavl"), (8, "Kazan")]
        .into_iter()
        .filter(|(_, city)| filter.city.as_deref().is_none_or(|c| c == *city))
        .take(filter.limit.unwrap_or(100))
        .map(|(id, city)| tour_json(id, city))
        .collect();
    Json(tours).into_response()
}

async fn get_tour(State(state): State<Arc<BackendState>>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    state.record("/tours/{id}", None, &headers);
    if id == 7 { Json(tour_json(7, "Yaroslavl")).into_response() } else { detail(StatusCode::NOT_FOUND, "Tour not found") }
}

async fn my_reservations(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("/reservations/my", None, &headers);
    match state.authorize(&headers) {
        Ok(_) => Json(json!([])).into_response(),
        Err(resp) => resp,
    }
}

async fn my_review(State(state): State<Arc<BackendState>>, headers: HeaderMap, Path(_tour_id): Path<i64>) -> Response {
    state.record("/reviews/my/{tour_id}", None, &headers);
    match state.authorize(&headers) {
        Ok(_) => detail(StatusCode::NOT_FOUND, "Review not found"),
        Err(resp) => resp,
    }
}

async fn admin_stats(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("/reservations/admin/stats", None, &headers);
    detail(StatusCode::INTERNAL_SERVER_ERROR, "stats unavailable")
}

// =============================================================================
// HARNESS
// =============================================================================

pub(crate) struct MockBackend {
    pub base_url: String,
    state: Arc<BackendState>,
}

impl MockBackend {
    pub(crate) async fn spawn() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/auth/register", post(register))
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/tours/", get(list_tours))
            .route("/tours/{id}", get(get_tour))
            .route("/reservations/my", get(my_reservations))
            .route("/reservations/admin/stats", get(admin_stats))
            .route("/reviews/my/{tour_id}", get(my_review))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), state }
    }

    pub(crate) fn config(&self) -> ClientConfig {
        ClientConfig::for_api_url(&self.base_url).unwrap()
    }

    pub(crate) fn add_account(&self, username: &str, password: &str, is_admin: bool) {
        let mut accounts = self.state.accounts.lock().unwrap();
        let user = user_json(accounts.len() + 1, username, &format!("{username}@x.com"), is_admin);
        accounts.insert(username.to_owned(), (password.to_owned(), user));
    }

    /// Invalidate every issued token server-side.
    pub(crate) fn revoke_tokens(&self) {
        self.state.tokens.lock().unwrap().clear();
    }

    /// Accept `token` for `username` as if it had been issued earlier.
    pub(crate) fn issue_token(&self, token: &str, username: &str) {
        self.state.tokens.lock().unwrap().insert(token.to_owned(), username.to_owned());
    }

    pub(crate) fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }

    pub(crate) fn last_seen(&self, path: &str) -> Option<SeenRequest> {
        self.seen().into_iter().rev().find(|r| r.path == path)
    }
}

/// A base URL nothing is listening on.
pub(crate) async fn unreachable_config() -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ClientConfig::for_api_url(&format!("http://{addr}")).unwrap()
}
