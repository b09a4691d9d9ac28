//! Tour catalog endpoints under `/tours`.

use super::client::ApiClient;
use super::types::{Tour, TourCreate, TourQuery, TourUpdate};
use crate::error::ApiError;

pub struct ToursApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn tours(&self) -> ToursApi<'_> {
        ToursApi { client: self }
    }
}

impl ToursApi<'_> {
    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn list(&self, query: &TourQuery) -> Result<Vec<Tour>, ApiError> {
        self.client.get_with("/tours/", query).await
    }

    /// # Errors
    ///
    /// Returns a 404 [`ApiError::Status`] for unknown tours.
    pub async fn get(&self, id: i64) -> Result<Tour, ApiError> {
        self.client.get(&format!("/tours/{id}")).await
    }

    /// Admin only.
    ///
    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] for non-admin callers.
    pub async fn create(&self, payload: &TourCreate) -> Result<Tour, ApiError> {
        self.client.post("/tours/", payload).await
    }

    /// Admin only.
    ///
    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn update(&self, id: i64, payload: &TourUpdate) -> Result<Tour, ApiError> {
        self.client.put(&format!("/tours/{id}"), payload).await
    }

    /// Admin only.
    ///
    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/tours/{id}")).await
    }
}
