use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingPatch, BookingStatus};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn find_booking(state: &AppState, id: &str) -> Result<Booking, AppError> {
    state
        .store
        .get_bookings()
        .into_iter()
        .find(|b| b.id == id)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status_filter = match query.status.as_deref() {
        Some(s) => Some(
            BookingStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {s}")))?,
        ),
        None => None,
    };

    let mut bookings = state.store.get_bookings();
    if let Some(status) = status_filter {
        bookings.retain(|b| b.status == status);
    }

    // Newest first, the dashboard order.
    bookings.sort_by_key(|b| {
        std::cmp::Reverse(
            DateTime::parse_from_rfc3339(&b.created_at)
                .map(|dt| dt.timestamp_millis())
                .unwrap_or(0),
        )
    });

    if let Some(limit) = query.limit {
        bookings.truncate(limit);
    }

    Ok(Json(bookings))
}

// POST /api/admin/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualBookingRequest {
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

/// Manual entry for an engagement confirmed outside the site. Skips review:
/// the record is `booked` from the start, with the proposal marked sent.
pub async fn add_manual_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ManualBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.client_name.trim().is_empty()
        || body.event_date.trim().is_empty()
        || body.event_type.trim().is_empty()
    {
        return Err(AppError::Validation(
            "clientName, eventDate and eventType are required".to_string(),
        ));
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
        status: BookingStatus::Booked,
        proposal_sent: true,
        created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    tracing::info!(id = %booking.id, date = %booking.event_date, "manual booking added");
    state.store.add_booking(booking.clone());

    Ok((StatusCode::CREATED, Json(booking)))
}

// POST /api/admin/bookings/:id/approve
//
// Approval confirms the engagement outright: pending goes straight to booked.
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    transition(&state, &id, BookingStatus::Booked)
}

// POST /api/admin/bookings/:id/reject
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    transition(&state, &id, BookingStatus::Rejected)
}

/// The wired status transitions only act on pending requests. The store
/// itself accepts any status through the edit path; the discipline lives
/// here, at the actions the panel exposes. The status check and the write
/// go through one conditional store call so two racing transitions cannot
/// both pass the pending check.
fn transition(
    state: &AppState,
    id: &str,
    to: BookingStatus,
) -> Result<Json<Booking>, AppError> {
    find_booking(state, id)?;

    let updated =
        state
            .store
            .update_booking_if_status(id, BookingStatus::Pending, &BookingPatch::status(to));
    if !updated {
        let current = find_booking(state, id)?;
        return Err(AppError::Conflict(format!(
            "booking {id} is {}, not pending",
            current.status.as_str()
        )));
    }
    tracing::info!(id, status = to.as_str(), "booking status updated");

    find_booking(state, id).map(Json)
}

// PUT /api/admin/bookings/:id
pub async fn edit_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    find_booking(&state, &id)?;
    state.store.update_booking(&id, &patch);

    find_booking(&state, &id).map(Json)
}

// DELETE /api/admin/bookings/:id
//
// For a pre-existing booking this clears the override and the seed defaults
// come back on the next read; only user-submitted records disappear for good.
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    find_booking(&state, &id)?;
    state.store.delete_booking(&id);
    tracing::info!(id, "booking deleted");

    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/admin/dates/:date/bookings
pub async fn bookings_for_date(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.store.bookings_for_date(&date)))
}

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub booked: usize,
    pub total: usize,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let bookings = state.store.get_bookings();
    let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();

    Ok(Json(StatsResponse {
        pending: count(BookingStatus::Pending),
        approved: count(BookingStatus::Approved),
        rejected: count(BookingStatus::Rejected),
        booked: count(BookingStatus::Booked),
        total: bookings.len(),
    }))
}
