//! What the tour-detail screen offers the current user.
//!
//! The booking panel and the review panel each depend on the session, the
//! user's reservation for this tour, and the user's own review. Deriving both
//! here keeps the rules in one place and out of rendering code.

use serde::Serialize;

use crate::net::types::{Reservation, ReservationStatus, Review};
use crate::state::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPanel {
    SignInRequired,
    /// No reservation yet; offer to book.
    Available,
    Reserved(ReservationStatus),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPanel {
    /// No review controls: anonymous visitors, or an edit requested without
    /// a confirmed reservation.
    Hidden,
    /// Confirmed reservation and no review yet.
    Compose,
    /// Editing the user's review with the given id.
    Edit(i64),
    /// Showing the user's own review with the given id.
    Own(i64),
    /// Reserved, waiting for admin confirmation before reviewing.
    AwaitingConfirmation,
    /// Reviews require a confirmed reservation first.
    ReservationRequired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TourDetailView {
    /// Show edit/delete controls for the tour itself.
    pub can_manage: bool,
    pub booking: BookingPanel,
    pub review: ReviewPanel,
}

impl TourDetailView {
    #[must_use]
    pub fn derive(
        session: &Session,
        tour_id: i64,
        my_reservations: &[Reservation],
        my_review: Option<&Review>,
        editing_review: bool,
    ) -> Self {
        let signed_in = session.is_authenticated;
        let reservation = my_reservations.iter().find(|r| r.tour_id == tour_id);
        let confirmed = reservation.is_some_and(|r| r.status == ReservationStatus::Confirmed);

        let booking = match (signed_in, reservation) {
            (false, _) => BookingPanel::SignInRequired,
            (true, None) => BookingPanel::Available,
            (true, Some(r)) => BookingPanel::Reserved(r.status),
        };

        let review = if !signed_in {
            ReviewPanel::Hidden
        } else {
            match my_review {
                Some(own) if editing_review && confirmed => ReviewPanel::Edit(own.id),
                // Editing is only offered on a confirmed reservation.
                Some(_) if editing_review => ReviewPanel::Hidden,
                Some(own) => ReviewPanel::Own(own.id),
                None if confirmed => ReviewPanel::Compose,
                None if reservation.is_some() => ReviewPanel::AwaitingConfirmation,
                None => ReviewPanel::ReservationRequired,
            }
        };

        Self { can_manage: session.is_admin(), booking, review }
    }
}

/// Reviews for the public list, minus the user's own (shown separately).
#[must_use]
pub fn public_reviews<'a>(all: &'a [Review], mine: Option<&Review>) -> Vec<&'a Review> {
    all.iter().filter(|r| mine.is_none_or(|m| m.id != r.id)).collect()
}

/// Mean rating rounded to one decimal, `None` when there are no reviews.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = total / reviews.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Admin screens require an authenticated admin user.
#[must_use]
pub fn can_access_admin(session: &Session) -> bool {
    session.is_admin()
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
