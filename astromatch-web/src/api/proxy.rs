//! Passthrough routes to the upstream compatibility API
//!
//! Bodies are forwarded unchanged and responses returned unchanged. A
//! non-success upstream status comes back as `{ "error": <upstream body> }`
//! with the same status.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use astromatch_common::filename::pdf_filename;

use super::localize;
use crate::error::{ApiError, ApiResult};
use crate::flow::PdfDocument;
use crate::AppState;

/// POST /api/astromatch
pub async fn astromatch(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let result = state.upstream.compatibility(&body).await.map_err(ApiError::from);
    Ok(Json(localize(&state, result).await?))
}

/// POST /api/match-multiple
pub async fn match_multiple(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.upstream.match_multiple(&body).await?))
}

/// Attachment response for a rendered report
pub(crate) fn pdf_response(document: PdfDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        document.bytes,
    )
        .into_response()
}

fn firstname<'a>(body: &'a Value, person: &str) -> &'a str {
    body.get(person)
        .and_then(|p| p.get("firstname"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// POST /api/pdf
///
/// Body is `{person1, person2, report}`; the download name is built from
/// the two first names.
pub async fn pdf(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Response> {
    let result = state.upstream.pdf(&body).await.map_err(ApiError::from);
    let bytes = localize(&state, result).await?;
    let filename = pdf_filename(firstname(&body, "person1"), firstname(&body, "person2"));
    Ok(pdf_response(PdfDocument { filename, bytes }))
}

/// POST /api/save-email
pub async fn save_email(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    if let Err(e) = state.upstream.save_email(&body).await {
        warn!("Failed to save email: {}", e);
    }
    Json(json!({ "success": true }))
}

/// POST /api/log
pub async fn log_event(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    if let Err(e) = state.upstream.log_event(&body).await {
        warn!("Failed to log event: {}", e);
    }
    Json(json!({ "success": true }))
}
