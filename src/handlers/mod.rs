pub mod admin;
pub mod transactions;
pub mod webhook;

use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub uptime_secs: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
