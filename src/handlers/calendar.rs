use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

// GET /api/calendar/:year/:month
#[derive(Serialize)]
pub struct CalendarMonthResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub booked: bool,
}

/// Per-day availability for the shared calendar. The client site greys out
/// booked days; the admin panel uses the same data and drills into the
/// per-date listing.
pub async fn calendar_month(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<CalendarMonthResponse>, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("invalid month: {year}-{month}")))?;

    let mut days = Vec::new();
    let mut day = first;
    while day.month() == month {
        let date = day.format("%Y-%m-%d").to_string();
        let booked = state.store.is_date_booked(&date);
        days.push(CalendarDay { date, booked });
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(Json(CalendarMonthResponse { year, month, days }))
}
