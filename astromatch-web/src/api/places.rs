//! Place search

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use astromatch_common::Locale;

use crate::error::ApiResult;
use crate::geocoding::{PlaceCandidate, PlaceField, SearchOutcome};
use crate::AppState;

/// Query parameters for place search
#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    #[serde(default)]
    pub q: String,

    /// Result language; the stored language when absent
    #[serde(default)]
    pub lang: Option<Locale>,

    /// Search slot: `person1` (default) or `person2`
    #[serde(default)]
    pub field: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    /// False when a newer search for the same field superseded this one
    pub fresh: bool,
    pub suggestions: Vec<PlaceCandidate>,
}

/// GET /api/places?q=&lang=&field=
///
/// Unknown fields are rejected with 400.
pub async fn search_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceQuery>,
) -> ApiResult<Json<PlaceResponse>> {
    let field = match query.field.as_deref() {
        Some(name) => name.parse::<PlaceField>()?,
        None => PlaceField::default(),
    };
    let locale = match query.lang {
        Some(locale) => locale,
        None => state.session.language().await,
    };

    let response = match state.places.search(field, &query.q, locale).await? {
        SearchOutcome::Fresh(suggestions) => PlaceResponse {
            fresh: true,
            suggestions,
        },
        SearchOutcome::Superseded => PlaceResponse {
            fresh: false,
            suggestions: state.places.suggestions(field),
        },
    };
    Ok(Json(response))
}
