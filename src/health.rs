//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, build commit, uptime, the redirect sources in chain order,
//! and cumulative request statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::{AppState, SourceInfo};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub commit: String,
    pub uptime_seconds: u64,
    pub sources: Vec<SourceInfo>,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub redirects: u64,
    pub not_found: u64,
    pub errors: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("REDIRECTOR_GIT_SHORT").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sources: state.sources.clone(),
        stats: StatsResponse {
            redirects: state.stats.redirects.load(Ordering::Relaxed),
            not_found: state.stats.not_found.load(Ordering::Relaxed),
            errors: state.stats.errors.load(Ordering::Relaxed),
        },
    })
}
