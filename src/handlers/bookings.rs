use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::booking;
use crate::errors::ServiceError;
use crate::handlers::common::PaginatedResponse;
use crate::services::bookings::{BookingListQuery, CreateBookingRequest};
use crate::{ApiResponse, AppState};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

/// Cancelled booking plus the amount refunded to the guest, which is always
/// the full stay price.
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelBookingResponse {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub refund_amount: Decimal,
}

impl From<booking::Model> for CancelBookingResponse {
    fn from(booking: booking::Model) -> Self {
        let refund_amount = booking.price;
        Self {
            booking,
            refund_amount,
        }
    }
}

/// Book a room
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = crate::ApiResponse<booking::Model>),
        (status = 400, description = "Invalid stay dates or guest count", body = crate::errors::ErrorResponse),
        (status = 404, description = "Hotel or room not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<booking::Model>>), ServiceError> {
    let saved = state
        .services
        .bookings
        .create_booking(user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))))
}

/// List the caller's bookings
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings", body = crate::ApiResponse<PaginatedResponse<booking::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<booking::Model>>>, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let (bookings, total) = state
        .services
        .bookings
        .list_user_bookings(user.user_id, &query)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        bookings, page, per_page, total,
    ))))
}

/// Get one of the caller's bookings
#[utoipa::path(
    get,
    path = "/api/v1/bookings/:id",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = crate::ApiResponse<booking::Model>),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<booking::Model>>, ServiceError> {
    let found = state
        .services
        .bookings
        .get_booking(id, user.user_id, user.is_admin())
        .await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Cancel a confirmed booking
#[utoipa::path(
    post,
    path = "/api/v1/bookings/:id/cancel",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = crate::ApiResponse<CancelBookingResponse>),
        (status = 400, description = "Not cancellable", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<ApiResponse<CancelBookingResponse>>, ServiceError> {
    let cancelled = state
        .services
        .bookings
        .cancel_booking(id, user.user_id, user.is_admin(), request.reason)
        .await?;
    Ok(Json(ApiResponse::success(cancelled.into())))
}

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/cancel", post(cancel_booking))
}
