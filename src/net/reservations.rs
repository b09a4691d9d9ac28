//! Reservation endpoints, including the admin approval workflow.

use super::client::ApiClient;
use super::types::{AdminStats, Page, Reservation, ReservationAdmin, ReservationCreate, ReservationQuery, ReservationUpdate};
use crate::error::ApiError;

pub struct ReservationsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn reservations(&self) -> ReservationsApi<'_> {
        ReservationsApi { client: self }
    }
}

impl ReservationsApi<'_> {
    /// Reservations owned by the current user.
    ///
    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn mine(&self, page: Page) -> Result<Vec<Reservation>, ApiError> {
        self.client.get_with("/reservations/my", &page).await
    }

    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] for someone else's reservation.
    pub async fn get(&self, id: i64) -> Result<Reservation, ApiError> {
        self.client.get(&format!("/reservations/{id}")).await
    }

    /// New reservations start out pending.
    ///
    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn create(&self, payload: &ReservationCreate) -> Result<Reservation, ApiError> {
        self.client.post("/reservations/", payload).await
    }

    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn update(&self, id: i64, payload: &ReservationUpdate) -> Result<Reservation, ApiError> {
        self.client.put(&format!("/reservations/{id}"), payload).await
    }

    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/reservations/{id}")).await
    }

    // -------------------------------------------------------------------------
    // admin
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] for non-admin callers.
    pub async fn all(&self, query: &ReservationQuery) -> Result<Vec<ReservationAdmin>, ApiError> {
        self.client.get_with("/reservations/admin/all", query).await
    }

    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] for non-admin callers.
    pub async fn confirm(&self, id: i64) -> Result<Reservation, ApiError> {
        self.client.put_bare(&format!("/reservations/admin/{id}/confirm")).await
    }

    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] for non-admin callers.
    pub async fn reject(&self, id: i64) -> Result<Reservation, ApiError> {
        self.client.put_bare(&format!("/reservations/admin/{id}/reject")).await
    }

    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] for non-admin callers.
    pub async fn stats(&self) -> Result<AdminStats, ApiError> {
        self.client.get("/reservations/admin/stats").await
    }
}
