pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/bookings", post(handlers::public::submit_booking))
        .route(
            "/api/availability/:date",
            get(handlers::public::date_availability),
        )
        .route(
            "/api/calendar/:year/:month",
            get(handlers::calendar::calendar_month),
        )
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings",
            post(handlers::admin::add_manual_booking),
        )
        .route(
            "/api/admin/bookings/:id/approve",
            post(handlers::admin::approve_booking),
        )
        .route(
            "/api/admin/bookings/:id/reject",
            post(handlers::admin::reject_booking),
        )
        .route(
            "/api/admin/bookings/:id",
            put(handlers::admin::edit_booking),
        )
        .route(
            "/api/admin/bookings/:id",
            delete(handlers::admin::delete_booking),
        )
        .route(
            "/api/admin/dates/:date/bookings",
            get(handlers::admin::bookings_for_date),
        )
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
