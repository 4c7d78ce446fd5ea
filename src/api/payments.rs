use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ApiError, ApiResponse, AppState, WebhookAck};
use crate::constants::payments::{CHECKOUT_COMPLETED, SIGNATURE_TOLERANCE_SECS};
use crate::services::ReconcileOutcome;
use crate::services::webhook::{WebhookError, parse_event, verify_signature};

const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /payments/webhook
///
/// Takes the raw body: the signature covers the exact bytes sent.
pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<WebhookAck>>, ApiError> {
    let secret = &state.shared.config.payments.webhook_secret;
    if secret.is_empty() {
        return Err(ApiError::internal("payments.webhook_secret is not configured"));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    verify_signature(
        &body,
        signature,
        secret,
        Utc::now().timestamp(),
        SIGNATURE_TOLERANCE_SECS,
    )?;

    let event = parse_event(&body)?;
    metrics::counter!("payment_webhooks_total", "type" => event.event_type.clone()).increment(1);

    if event.event_type != CHECKOUT_COMPLETED {
        debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
        return Ok(Json(ApiResponse::success(WebhookAck {
            received: true,
            outcome: None,
        })));
    }

    let booking_id = event
        .booking_id()
        .ok_or_else(|| ApiError::validation("Webhook event has no metadata.booking_id"))?;

    let outcome = state
        .shared
        .booking_service
        .on_payment_confirmed(booking_id, &event.id)
        .await?;

    info!(event_id = %event.id, booking_id, ?outcome, "Payment webhook processed");

    let outcome = match outcome {
        ReconcileOutcome::Transitioned => "paid",
        ReconcileOutcome::AlreadyPaid => "already_paid",
        ReconcileOutcome::Duplicate => "duplicate",
    };

    Ok(Json(ApiResponse::success(WebhookAck {
        received: true,
        outcome: Some(outcome.to_string()),
    })))
}
