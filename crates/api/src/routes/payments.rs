//! Payment provider callbacks.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{PaymentPurpose, PaymentReceipt, Reply};
use domain::Money;
use serde::{Deserialize, Serialize};

use super::parse_session_id;
use super::sessions::AppState;
use crate::error::ApiError;

fn prepayment() -> PaymentPurpose {
    PaymentPurpose::Prepayment
}

#[derive(Deserialize)]
pub struct PreCheckoutRequest {
    #[serde(default = "prepayment")]
    pub purpose: PaymentPurpose,
}

#[derive(Serialize)]
pub struct PreCheckoutResponse {
    pub ok: bool,
}

#[derive(Deserialize)]
pub struct PaymentSuccessRequest {
    pub payment_id: String,
    pub purpose: PaymentPurpose,
    pub amount_minor: i64,
}

/// POST /sessions/:id/payments/pre-checkout: Asked right before charging.
#[tracing::instrument(skip(state, req))]
pub async fn pre_checkout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PreCheckoutRequest>,
) -> Result<Json<PreCheckoutResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let ok = state
        .coordinator
        .approve_checkout(session_id, req.purpose)
        .await;
    Ok(Json(PreCheckoutResponse { ok }))
}

/// POST /sessions/:id/payments/success: The provider reports a completed payment.
#[tracing::instrument(skip(state, req))]
pub async fn success(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentSuccessRequest>,
) -> Result<Json<Reply>, ApiError> {
    let session_id = parse_session_id(&id)?;
    if req.payment_id.trim().is_empty() {
        return Err(ApiError::BadRequest("payment_id must not be empty".to_string()));
    }

    let receipt = PaymentReceipt {
        payment_id: req.payment_id,
        purpose: req.purpose,
        amount: Money::from_minor(req.amount_minor),
    };
    let reply = state
        .coordinator
        .payment_succeeded(session_id, receipt)
        .await?;
    Ok(Json(reply))
}
