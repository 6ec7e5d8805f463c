use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::info;

use crate::errors::ServiceError;
use crate::services::payments::WebhookOutcome;
use crate::AppState;

const SIGNATURE_HEADER: &str = "x-razorpay-signature";
const EVENT_ID_HEADER: &str = "x-razorpay-event-id";

/// Gateway webhook receiver. Takes the raw body so the signature check runs
/// over the exact bytes sent, then hands off to the payment service.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body(content = String, description = "Raw gateway event; the signature covers these exact bytes"),
    responses(
        (status = 200, description = "Webhook acknowledged"),
        (status = 400, description = "Unparseable payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or bad signature", body = crate::errors::ErrorResponse),
        (status = 409, description = "Capture conflicts with the booking state", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthorized("Missing webhook signature".to_string()))?;
    let event_id = headers
        .get(EVENT_ID_HEADER)
        .and_then(|value| value.to_str().ok());

    // An unauthenticated caller gets 401 here; the user-facing verify
    // endpoint keeps reporting signature mismatches as 400.
    let outcome = state
        .services
        .payments
        .handle_webhook(body.as_bytes(), signature, event_id)
        .await
        .map_err(|err| match err {
            ServiceError::SignatureInvalid => {
                ServiceError::Unauthorized("Invalid webhook signature".to_string())
            }
            other => other,
        })?;

    let status = match outcome {
        WebhookOutcome::Processed => "processed",
        WebhookOutcome::Duplicate => "duplicate",
        WebhookOutcome::Ignored => "ignored",
    };
    info!(status, "webhook acknowledged");
    Ok(Json(json!({ "status": status })))
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhook", post(receive_webhook))
}
