//! Form submission, report slot, history and language routes

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use astromatch_common::models::{FormSnapshot, HistoryEntry};
use astromatch_common::report::{derive_insights, derive_intensities, overall_score, Insights, IntensityMap};
use astromatch_common::Locale;

use super::localize;
use super::proxy::pdf_response;
use crate::error::{ApiError, ApiResult};
use crate::flow::{ReportView, Submission};
use crate::AppState;

/// POST /api/compatibility
///
/// Full submission: validation, upstream computation, history and session
/// slots. Malformed bodies are rejected with 400 like invalid fields.
pub async fn compute(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Submission>> {
    let form: FormSnapshot = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid form: {}", e)))?;
    let result = state.flow.submit(form).await;
    Ok(Json(localize(&state, result).await?))
}

/// GET /api/report
pub async fn current_report(State(state): State<AppState>) -> ApiResult<Json<ReportView>> {
    Ok(Json(state.flow.current_report().await?))
}

/// POST /api/report/pdf
pub async fn current_report_pdf(State(state): State<AppState>) -> ApiResult<Response> {
    let result = state.flow.report_pdf().await;
    Ok(pdf_response(localize(&state, result).await?))
}

/// GET /api/history
pub async fn history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list().await)
}

/// GET /api/history/:index
pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<HistoryEntry>> {
    state
        .history
        .get_at(index)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No history entry at index {}", index)))
}

/// POST /api/history/:index/view
pub async fn view_history_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<ReportView>> {
    Ok(Json(state.flow.view_history(index).await?))
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub lang: Locale,
}

/// GET /api/lang
pub async fn get_language(State(state): State<AppState>) -> Json<LanguageResponse> {
    Json(LanguageResponse {
        lang: state.session.language().await,
    })
}

/// POST /api/lang/toggle
pub async fn toggle_language(State(state): State<AppState>) -> ApiResult<Json<LanguageResponse>> {
    let lang = state.session.toggle_language().await?;
    tracing::info!(lang = lang.as_str(), "Language switched");
    Ok(Json(LanguageResponse { lang }))
}

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub report: Value,
    #[serde(default)]
    pub lang: Option<Locale>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub lang: Locale,
    pub overall_score: f64,
    pub insights: Insights,
    pub intensities: IntensityMap,
}

/// POST /api/insights
///
/// Normalizes an arbitrary report without touching any stored state.
pub async fn insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Json<InsightsResponse> {
    let lang = match request.lang {
        Some(lang) => lang,
        None => state.session.language().await,
    };
    Json(InsightsResponse {
        lang,
        overall_score: overall_score(&request.report),
        insights: derive_insights(&request.report, lang),
        intensities: derive_intensities(&request.report, lang),
    })
}
