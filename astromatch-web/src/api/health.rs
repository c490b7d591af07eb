//! Service health
//!
//! Reports whether the local store answers and whether checkout can be
//! offered. Upstream services are not probed.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use astromatch_common::storage::keys;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the local store fails
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    pub checkout: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = match state.store.get(keys::LANG).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Local store unavailable: {}", e);
            false
        }
    };

    Json(HealthResponse {
        status: if store_ok { "ok" } else { "degraded" },
        module: "astromatch-web",
        version: env!("CARGO_PKG_VERSION"),
        store: if store_ok { "ok" } else { "unavailable" },
        checkout: state.stripe.is_some(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
