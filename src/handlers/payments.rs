use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::booking;
use crate::errors::ServiceError;
use crate::services::payments::{PaymentOrderResponse, VerifyPaymentRequest};
use crate::{ApiResponse, AppState};

/// Either field may be omitted, but an order needs at least one of them:
/// with a booking id the amount defaults to the stored stay price, without
/// one the amount is required.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub amount_rupees: Option<Decimal>,
    pub booking_id: Option<Uuid>,
}

/// Create a gateway order
#[utoipa::path(
    post,
    path = "/api/v1/payments/create-order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Gateway order created", body = crate::ApiResponse<PaymentOrderResponse>),
        (status = 400, description = "Missing or invalid amount, or booking not payable", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Gateway unavailable", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentOrderResponse>>), ServiceError> {
    let order = state
        .services
        .payments
        .create_payment_order(
            user.user_id,
            user.is_admin(),
            request.amount_rupees,
            request.booking_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Verify a checkout callback and mark the booking paid
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified", body = crate::ApiResponse<booking::Model>),
        (status = 400, description = "Signature mismatch", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown payment order", body = crate::errors::ErrorResponse),
        (status = 409, description = "Conflicting payment state", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<ApiResponse<booking::Model>>, ServiceError> {
    let booking = state
        .services
        .payments
        .confirm_payment(user.user_id, user.is_admin(), request)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        booking,
        "Payment verified".to_string(),
    )))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify_payment))
}
