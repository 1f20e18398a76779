//! Dashboard statistics endpoint

use axum::{extract::State, routing::get, Json, Router};
use tunelib_common::db::DashboardStats;

use crate::AppState;

/// GET /stats; never fails
pub async fn get_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.stats.dashboard().await)
}

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/", get(get_stats))
}
