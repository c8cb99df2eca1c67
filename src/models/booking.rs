use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Timestamp-derived booking id, with a process-local counter so two requests
/// landing in the same millisecond cannot collide.
pub fn new_booking_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{n}", chrono::Utc::now().timestamp_millis())
}

/// One event request/engagement. Field names stay camelCase on the wire and
/// in the persisted blobs to match the layout the web and mobile clients
/// already write under `band_bookings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    /// Calendar date, `YYYY-MM-DD`. The key for availability lookups.
    pub event_date: String,
    pub event_type: String,
    pub venue: String,
    /// Minutes.
    pub duration: i64,
    /// Decimal string, validated at the submission boundary.
    pub budget: String,
    pub message: String,
    pub status: BookingStatus,
    pub proposal_sent: bool,
    /// RFC 3339 timestamp, used only for newest-first ordering.
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Booked,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Booked => "booked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "approved" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            "booked" => Some(BookingStatus::Booked),
            _ => None,
        }
    }
}

/// Partial-field edit, shallow-merged onto an existing booking. Absent fields
/// leave the current value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub event_date: Option<String>,
    pub event_type: Option<String>,
    pub venue: Option<String>,
    pub duration: Option<i64>,
    pub budget: Option<String>,
    pub message: Option<String>,
    pub status: Option<BookingStatus>,
    pub proposal_sent: Option<bool>,
}

impl BookingPatch {
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply(&self, booking: &mut Booking) {
        if let Some(v) = &self.client_name {
            booking.client_name = v.clone();
        }
        if let Some(v) = &self.client_email {
            booking.client_email = v.clone();
        }
        if let Some(v) = &self.client_phone {
            booking.client_phone = v.clone();
        }
        if let Some(v) = &self.event_date {
            booking.event_date = v.clone();
        }
        if let Some(v) = &self.event_type {
            booking.event_type = v.clone();
        }
        if let Some(v) = &self.venue {
            booking.venue = v.clone();
        }
        if let Some(v) = self.duration {
            booking.duration = v;
        }
        if let Some(v) = &self.budget {
            booking.budget = v.clone();
        }
        if let Some(v) = &self.message {
            booking.message = v.clone();
        }
        if let Some(v) = self.status {
            booking.status = v;
        }
        if let Some(v) = self.proposal_sent {
            booking.proposal_sent = v;
        }
    }
}
