use std::sync::Arc;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::{
        jobdtos::ApiResponse,
        paymentdtos::{GatewayWebhookEvent, InitiatedPaymentDto},
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

/// Public routes; the webhook authenticates by signature, not by session.
pub fn payments_handler() -> Router {
    Router::new().route("/webhook", post(gateway_webhook))
}

pub async fn initiate_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let initiated = app_state
        .payment_service
        .initiate_payment(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment initiated",
        InitiatedPaymentDto {
            payment: initiated.payment,
            checkout_url: initiated.checkout_url,
        },
    )))
}

/// Gateway callback. A bad signature is rejected, but once the payload is
/// accepted the response is always 200: the gateway retries on anything
/// else and the settlement path is idempotent anyway.
pub async fn gateway_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let signature = headers
        .get("Paymongo-Signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !app_state
        .payment_gateway
        .verify_webhook_signature(&body, signature)
    {
        tracing::warn!("webhook rejected: bad signature");
        return StatusCode::UNAUTHORIZED;
    }

    let event: GatewayWebhookEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("webhook payload did not parse: {}", e);
            return StatusCode::OK;
        }
    };

    let Some(reference) = event.payment_reference() else {
        tracing::debug!("webhook event carried no payment reference, ignoring");
        return StatusCode::OK;
    };

    let outcome = if event.is_success() {
        Some(true)
    } else if event.is_failure() {
        Some(false)
    } else {
        None
    };

    if let Some(succeeded) = outcome {
        if let Err(e) = app_state
            .payment_service
            .handle_gateway_event(reference, succeeded)
            .await
        {
            // Logged, not surfaced: reconciliation will pick it up.
            tracing::error!("webhook settlement for {} failed: {}", reference, e);
        }
    }

    StatusCode::OK
}
