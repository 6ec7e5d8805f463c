use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{hotel, review};
use crate::errors::ServiceError;
use crate::handlers::common::PaginatedResponse;
use crate::services::catalog::{HotelSearchQuery, ReviewInput};
use crate::{ApiResponse, AppState};

/// Hotel detail plus its decoded room list and recent reviews.
#[derive(Debug, Serialize, ToSchema)]
pub struct HotelDetail {
    #[serde(flatten)]
    pub hotel: hotel::Model,
    pub reviews: Vec<review::Model>,
}

/// Search the hotel catalog
#[utoipa::path(
    get,
    path = "/api/v1/hotels",
    params(HotelSearchQuery),
    responses(
        (status = 200, description = "Matching hotels", body = crate::ApiResponse<PaginatedResponse<hotel::Model>>),
        (status = 400, description = "Invalid filters", body = crate::errors::ErrorResponse)
    ),
    tag = "Hotels"
)]
pub async fn search_hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelSearchQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<hotel::Model>>>, ServiceError> {
    let (hotels, total) = state.services.catalog.search_hotels(&query).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        hotels,
        query.page(),
        query.per_page(),
        total,
    ))))
}

/// Featured hotels for the landing page
#[utoipa::path(
    get,
    path = "/api/v1/hotels/featured",
    responses(
        (status = 200, description = "Featured hotels", body = crate::ApiResponse<Vec<hotel::Model>>)
    ),
    tag = "Hotels"
)]
pub async fn featured_hotels(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<hotel::Model>>>, ServiceError> {
    let hotels = state.services.catalog.list_featured(8).await?;
    Ok(Json(ApiResponse::success(hotels)))
}

/// Get a hotel with its rooms and reviews
#[utoipa::path(
    get,
    path = "/api/v1/hotels/:id",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel detail", body = crate::ApiResponse<HotelDetail>),
        (status = 404, description = "Hotel not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Hotels"
)]
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<HotelDetail>>, ServiceError> {
    let hotel = state.services.catalog.get_hotel(id).await?;
    let reviews = state.services.catalog.recent_reviews(id, 10).await?;
    Ok(Json(ApiResponse::success(HotelDetail { hotel, reviews })))
}

/// List reviews for a hotel
#[utoipa::path(
    get,
    path = "/api/v1/hotels/:id/reviews",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Reviews", body = crate::ApiResponse<Vec<review::Model>>),
        (status = 404, description = "Hotel not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Hotels"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<review::Model>>>, ServiceError> {
    let reviews = state.services.catalog.list_reviews(id).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// Leave a review on a hotel
#[utoipa::path(
    post,
    path = "/api/v1/hotels/:id/reviews",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    request_body = ReviewInput,
    responses(
        (status = 201, description = "Review created", body = crate::ApiResponse<review::Model>),
        (status = 400, description = "Invalid review", body = crate::errors::ErrorResponse),
        (status = 404, description = "Hotel not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hotels"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<ApiResponse<review::Model>>), ServiceError> {
    let saved = state
        .services
        .catalog
        .add_review(id, &user.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))))
}

/// Public read-only catalog routes.
pub fn hotel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_hotels))
        .route("/featured", get(featured_hotels))
        .route("/:id", get(get_hotel))
        .route("/:id/reviews", get(list_reviews))
}

/// Review submission, mounted behind authentication.
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/:id/reviews", post(create_review))
}
