//! Wire DTOs for the client/backend boundary.
//!
//! DESIGN
//! ======
//! These types mirror the backend's JSON schemas field for field. Timestamps
//! stay as the backend's ISO-8601 strings; the client only displays and
//! round-trips them, so parsing would add failure modes without a consumer.

use serde::{Deserialize, Serialize};

// =============================================================================
// USERS
// =============================================================================

/// The authenticated account as returned by `GET /auth/me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    /// Grants access to tour management and reservation approval.
    pub is_admin: bool,
    pub created_at: String,
}

/// Extra account metadata kept separately from the core user row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub date_of_birth: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Bearer credential issued by `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

// =============================================================================
// TOURS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub agency: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    /// Price per person.
    pub price: f64,
    pub city: String,
    pub payment_terms: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TourCreate {
    pub title: String,
    pub agency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub price: f64,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TourUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

/// Query for `GET /tours/`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TourQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

// =============================================================================
// RESERVATIONS
// =============================================================================

/// Admin approval state of a reservation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

impl ReservationStatus {
    /// Short human-readable label for status badges.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending review",
            Self::Confirmed => "Confirmed",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub tour_id: i64,
    pub user_id: i64,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub created_at: String,
    /// The reserved tour, embedded by the backend.
    pub tour: Tour,
}

/// Reservation as listed on the admin screen, annotated with the booker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservationAdmin {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReservationCreate {
    pub tour_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReservationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
}

/// Query for `GET /reservations/admin/all`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReservationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub confirmed_reservations: i64,
    pub total_revenue: f64,
    pub total_customers: i64,
}

// =============================================================================
// REVIEWS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub tour_id: i64,
    /// `None` once the author's account has been deleted.
    pub user_id: Option<i64>,
    pub text: String,
    /// 1 through 10.
    pub rating: i32,
    pub created_at: String,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewCreate {
    pub tour_id: i64,
    pub text: String,
    pub rating: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReviewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
}

/// Plain `limit`/`offset` paging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
