//! Innkeeper API Library
//!
//! Hotel search, booking, and payment reconciliation backend.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, ROLE_ADMIN};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

/// Standard envelope for successful responses.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.clone()),
            errors: Some(vec![message]),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// All routes under `/api/v1`.
pub fn api_v1_routes(state: AppState) -> Router<AppState> {
    // Public surface: catalog reads, auth, and the signature-verified webhook.
    let hotels_public = handlers::hotels::hotel_routes();
    let payment_webhook = handlers::payment_webhooks::webhook_routes();
    let auth = auth::auth_routes(state.clone());

    // Authenticated surface.
    let reviews = handlers::hotels::review_routes().with_auth(state.clone());
    let bookings = handlers::bookings::booking_routes().with_auth(state.clone());
    let payments = handlers::payments::payment_routes().with_auth(state.clone());
    let profile = handlers::profile::profile_routes().with_auth(state.clone());
    let dashboard = handlers::profile::dashboard_routes().with_auth(state.clone());

    // Admin surface.
    let admin = handlers::admin::admin_routes().with_role(ROLE_ADMIN, state);

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/auth", auth)
        .nest("/hotels", hotels_public.merge(reviews))
        .nest("/bookings", bookings)
        .nest("/payments", payments.merge(payment_webhook))
        .nest("/profile", profile)
        .nest("/dashboard", dashboard)
        .nest("/admin", admin)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "innkeeper-api",
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
