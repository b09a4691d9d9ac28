//! Account endpoints under `/auth`.

use super::client::ApiClient;
use super::types::{PasswordChange, ProfileUpdate, Token, User, UserCreate, UserProfile, UserUpdate};
use crate::error::ApiError;

/// Credential and identity calls the session store depends on.
///
/// [`ApiClient`] is the production implementation; tests substitute a mock.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account. The new account is not logged in.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection (duplicate username/email, validation).
    async fn register(&self, payload: &UserCreate) -> Result<User, ApiError>;

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials.
    async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError>;

    /// Resolve the identity behind the persisted bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is missing, expired, or revoked.
    async fn current_user(&self) -> Result<User, ApiError>;
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

impl AuthApi<'_> {
    /// `POST /auth/register`
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection.
    pub async fn register(&self, payload: &UserCreate) -> Result<User, ApiError> {
        self.client.post("/auth/register", payload).await
    }

    /// `POST /auth/login` with form-encoded credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        self.client
            .post_form("/auth/login", &[("username", username), ("password", password)])
            .await
    }

    /// `GET /auth/me`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is not accepted.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.get("/auth/me").await
    }

    /// `GET /auth/me/profile`
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ApiError::Status`] if no profile exists yet.
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.client.get("/auth/me/profile").await
    }

    /// `PUT /auth/me/profile`
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.client.put("/auth/me/profile", update).await
    }

    /// `PUT /auth/me`
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection (e.g. username taken).
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        self.client.put("/auth/me", update).await
    }

    /// `PUT /auth/me/password`
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection (e.g. wrong current password).
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<(), ApiError> {
        let body = PasswordChange { current_password: current_password.to_owned(), new_password: new_password.to_owned() };
        self.client.put_discard("/auth/me/password", &body).await
    }
}

#[async_trait::async_trait]
impl AuthBackend for ApiClient {
    async fn register(&self, payload: &UserCreate) -> Result<User, ApiError> {
        self.auth().register(payload).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        self.auth().login(username, password).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.auth().current_user().await
    }
}
