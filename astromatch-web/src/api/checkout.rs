//! Checkout and access verification

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use astromatch_common::models::CheckoutRequest;

use super::localize;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyAccessRequest {
    pub session_id: String,
}

/// POST /api/checkout
///
/// Returns the hosted payment page URL. Without a secret key the request
/// fails with 500 before contacting the provider.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let stripe = state.stripe.as_ref().ok_or(ApiError::PaymentNotConfigured)?;

    let result = stripe
        .create_checkout_session(
            &request,
            state.stripe_price_id.as_deref(),
            &state.public_origin,
        )
        .await
        .map_err(ApiError::from);
    let url = localize(&state, result).await?;

    Ok(Json(CheckoutResponse { url }))
}

/// POST /api/verify-access
pub async fn verify_access(
    State(state): State<AppState>,
    Json(request): Json<VerifyAccessRequest>,
) -> ApiResult<Json<Value>> {
    state.flow.unlock(&request.session_id).await?;
    Ok(Json(json!({ "success": true })))
}
