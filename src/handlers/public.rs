use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::state::AppState;

// POST /api/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBookingRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default = "default_duration")]
    pub duration: i64,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub message: String,
}

fn default_duration() -> i64 {
    60
}

/// Visitor booking request. Lands as `pending`; the date must still be free.
pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if body.client_name.trim().is_empty() {
        return Err(AppError::Validation("clientName is required".to_string()));
    }
    if body.event_date.trim().is_empty() {
        return Err(AppError::Validation("eventDate is required".to_string()));
    }
    if body.event_type.trim().is_empty() {
        return Err(AppError::Validation("eventType is required".to_string()));
    }
    if !body.client_email.is_empty() && !looks_like_email(&body.client_email) {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    if !body.budget.is_empty() && !valid_budget(&body.budget) {
        return Err(AppError::Validation(
            "budget must be 1 to 5 digits".to_string(),
        ));
    }
    if state.store.is_date_booked(&body.event_date) {
        return Err(AppError::Conflict(format!(
            "date {} is already booked",
            body.event_date
        )));
    }

    let now = Utc::now();
    let booking = Booking {
        id: crate::models::booking::new_booking_id(),
        client_name: body.client_name,
        client_email: body.client_email,
        client_phone: body.client_phone,
        event_date: body.event_date,
        event_type: body.event_type,
        venue: body.venue,
        duration: body.duration,
        budget: body.budget,
        message: body.message,
        status: BookingStatus::Pending,
        proposal_sent: false,
        created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    tracing::info!(id = %booking.id, date = %booking.event_date, "new booking request");
    state.store.add_booking(booking.clone());

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/availability/:date
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub booked: bool,
}

pub async fn date_availability(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Json<AvailabilityResponse> {
    let booked = state.store.is_date_booked(&date);
    Json(AvailabilityResponse { date, booked })
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn valid_budget(s: &str) -> bool {
    (1..=5).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
}
