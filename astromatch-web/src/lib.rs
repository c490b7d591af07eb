//! astromatch-web library - AstroMatch front-end service
//!
//! Proxies compatibility computations to the upstream API, resolves birth
//! places, sells the full report through a hosted checkout and keeps the
//! per-user state (history, last report, language) in the local store.

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use astromatch_common::config::TomlConfig;
use astromatch_common::storage::{HistoryStore, KeyValueStore, SessionCache};

pub mod api;
pub mod checkout;
pub mod error;
pub mod flow;
pub mod geocoding;
pub mod upstream;

use checkout::StripeClient;
use flow::CompatibilityFlow;
use geocoding::PlaceResolver;
use upstream::UpstreamClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub places: Arc<PlaceResolver>,
    /// Absent when no payment secret key is configured
    pub stripe: Option<StripeClient>,
    pub stripe_price_id: Option<String>,
    /// Origin used for checkout return URLs
    pub public_origin: String,
    /// Backing store of the history and session slots
    pub store: Arc<dyn KeyValueStore>,
    pub history: HistoryStore,
    pub session: SessionCache,
    pub flow: CompatibilityFlow,
}

impl AppState {
    /// Build clients and stores from the bootstrap configuration
    pub fn new(config: &TomlConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let timeout = config.upstream_timeout();

        let upstream = UpstreamClient::new(&config.api_base, config.api_key.clone(), timeout)?;
        let places = PlaceResolver::new(&config.geocoding_base, timeout)?;
        let stripe = match config.stripe_secret_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Some(StripeClient::new(&config.stripe_base, key, timeout)?),
            None => {
                tracing::warn!("No payment secret key configured; checkout is disabled");
                None
            }
        };

        let history = HistoryStore::new(store.clone());
        let session = SessionCache::new(store.clone());
        let flow = CompatibilityFlow::new(upstream.clone(), history.clone(), session.clone());

        Ok(Self {
            upstream,
            places: Arc::new(places),
            stripe,
            stripe_price_id: config.stripe_price_id.clone().filter(|id| !id.is_empty()),
            public_origin: config.public_origin.clone(),
            store,
            history,
            session,
            flow,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        // Upstream passthrough
        .route("/api/astromatch", post(api::astromatch))
        .route("/api/match-multiple", post(api::match_multiple))
        .route("/api/pdf", post(api::pdf))
        .route("/api/save-email", post(api::save_email))
        .route("/api/log", post(api::log_event))
        // Checkout
        .route("/api/checkout", post(api::create_checkout))
        .route("/api/verify-access", post(api::verify_access))
        // Place search
        .route("/api/places", get(api::search_places))
        // Submission flow and local state
        .route("/api/compatibility", post(api::compute))
        .route("/api/report", get(api::current_report))
        .route("/api/report/pdf", post(api::current_report_pdf))
        .route("/api/history", get(api::history))
        .route("/api/history/:index", get(api::get_history_entry))
        .route("/api/history/:index/view", post(api::view_history_entry))
        .route("/api/lang", get(api::get_language))
        .route("/api/lang/toggle", post(api::toggle_language))
        .route("/api/insights", post(api::insights));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
