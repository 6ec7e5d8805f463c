use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{AuthUser, ChangePasswordRequest};
use crate::errors::ServiceError;
use crate::services::dashboard::UserDashboard;
use crate::services::profiles::{ProfileView, UpdateProfileRequest};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePreferencesRequest {
    pub preferences: serde_json::Value,
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = crate::ApiResponse<ProfileView>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ProfileView>>, ServiceError> {
    let profile = state.services.profiles.get_profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = crate::ApiResponse<ProfileView>),
        (status = 400, description = "Invalid profile fields", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, ServiceError> {
    let profile = state
        .services
        .profiles
        .update_profile(user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Replace the caller's stay preferences
#[utoipa::path(
    put,
    path = "/api/v1/profile/preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Updated profile", body = crate::ApiResponse<ProfileView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, ServiceError> {
    let profile = state
        .services
        .profiles
        .update_preferences(user.user_id, request.preferences)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/api/v1/profile/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Weak new password", body = crate::errors::ErrorResponse),
        (status = 401, description = "Current password incorrect", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.auth.change_password(user.user_id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        (),
        "Password changed".to_string(),
    )))
}

/// Traveller dashboard: upcoming stays, loyalty balance, spend
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = crate::ApiResponse<UserDashboard>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn user_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserDashboard>>, ServiceError> {
    let dashboard = state.services.dashboard.user_dashboard(user.user_id).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/preferences", put(update_preferences))
        .route("/change-password", post(change_password))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(user_dashboard))
}
