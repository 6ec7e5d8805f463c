use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{booking, hotel, setting};
use crate::errors::ServiceError;
use crate::handlers::common::PaginatedResponse;
use crate::services::bookings::BookingListQuery;
use crate::services::catalog::HotelInput;
use crate::services::dashboard::AdminDashboard;
use crate::services::settings::UpdateSettingsRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetBookingStatusRequest {
    pub status: String,
    /// Optional payment status override applied in the same update
    pub payment_status: Option<String>,
}

/// Site-wide metrics for the admin overview
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    responses(
        (status = 200, description = "Metrics", body = crate::ApiResponse<AdminDashboard>),
        (status = 403, description = "Admin only", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AdminDashboard>>, ServiceError> {
    let dashboard = state.services.dashboard.admin_dashboard().await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// List bookings across all users
#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings", body = crate::ApiResponse<PaginatedResponse<booking::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<booking::Model>>>, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let (bookings, total) = state.services.bookings.list_all_bookings(&query).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        bookings, page, per_page, total,
    ))))
}

/// Override a booking's status
#[utoipa::path(
    put,
    path = "/api/v1/admin/bookings/:id/status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = SetBookingStatusRequest,
    responses(
        (status = 200, description = "Updated booking", body = crate::ApiResponse<booking::Model>),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetBookingStatusRequest>,
) -> Result<Json<ApiResponse<booking::Model>>, ServiceError> {
    let updated = state
        .services
        .bookings
        .admin_set_status(id, &request.status, request.payment_status.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Delete a booking record
#[utoipa::path(
    delete,
    path = "/api/v1/admin/bookings/:id",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.bookings.delete_booking(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a hotel to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/admin/hotels",
    request_body = HotelInput,
    responses(
        (status = 201, description = "Hotel created", body = crate::ApiResponse<hotel::Model>),
        (status = 400, description = "Invalid hotel", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_hotel(
    State(state): State<AppState>,
    Json(input): Json<HotelInput>,
) -> Result<(StatusCode, Json<ApiResponse<hotel::Model>>), ServiceError> {
    let saved = state.services.catalog.create_hotel(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))))
}

/// Replace a hotel's catalog entry
#[utoipa::path(
    put,
    path = "/api/v1/admin/hotels/:id",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    request_body = HotelInput,
    responses(
        (status = 200, description = "Updated hotel", body = crate::ApiResponse<hotel::Model>),
        (status = 404, description = "Hotel not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<HotelInput>,
) -> Result<Json<ApiResponse<hotel::Model>>, ServiceError> {
    let saved = state.services.catalog.update_hotel(id, input).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// Remove a hotel from the catalog
#[utoipa::path(
    delete,
    path = "/api/v1/admin/hotels/:id",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 204, description = "Hotel deleted"),
        (status = 404, description = "Hotel not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.catalog.delete_hotel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read site settings
#[utoipa::path(
    get,
    path = "/api/v1/admin/settings",
    responses(
        (status = 200, description = "Settings", body = crate::ApiResponse<setting::Model>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<setting::Model>>, ServiceError> {
    let settings = state.services.settings.get_settings().await?;
    Ok(Json(ApiResponse::success(settings)))
}

/// Replace site settings
#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = crate::ApiResponse<setting::Model>),
        (status = 400, description = "Invalid settings", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<setting::Model>>, ServiceError> {
    let settings = state.services.settings.update_settings(request).await?;
    Ok(Json(ApiResponse::success(settings)))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin_dashboard))
        .route("/bookings", get(list_all_bookings))
        .route("/bookings/:id", axum::routing::delete(delete_booking))
        .route("/bookings/:id/status", put(set_booking_status))
        .route("/hotels", axum::routing::post(create_hotel))
        .route("/hotels/:id", put(update_hotel).delete(delete_hotel))
        .route("/settings", get(get_settings).put(update_settings))
}
