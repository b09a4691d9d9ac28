//! Per-tour review endpoints under `/reviews`.

use super::client::ApiClient;
use super::types::{Page, Review, ReviewCreate, ReviewUpdate};
use crate::error::ApiError;

pub struct ReviewsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi { client: self }
    }
}

impl ReviewsApi<'_> {
    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn for_tour(&self, tour_id: i64, page: Page) -> Result<Vec<Review>, ApiError> {
        self.client.get_with(&format!("/reviews/tour/{tour_id}"), &page).await
    }

    /// The current user's review of `tour_id`.
    ///
    /// A 404 means "no review yet" and maps to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Every other failure, including 401, propagates.
    pub async fn mine_for_tour(&self, tour_id: i64) -> Result<Option<Review>, ApiError> {
        match self.client.get(&format!("/reviews/my/{tour_id}")).await {
            Ok(review) => Ok(Some(review)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn get(&self, id: i64) -> Result<Review, ApiError> {
        self.client.get(&format!("/reviews/{id}")).await
    }

    /// Requires a confirmed reservation; one review per user per tour.
    ///
    /// # Errors
    ///
    /// Returns a 403 [`ApiError::Status`] without a confirmed reservation and a
    /// 400 if a review already exists.
    pub async fn create(&self, payload: &ReviewCreate) -> Result<Review, ApiError> {
        self.client.post("/reviews/", payload).await
    }

    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn update(&self, id: i64, payload: &ReviewUpdate) -> Result<Review, ApiError> {
        self.client.put(&format!("/reviews/{id}"), payload).await
    }

    /// # Errors
    ///
    /// Propagates any backend or transport failure.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/reviews/{id}")).await
    }
}
