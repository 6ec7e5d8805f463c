use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Innkeeper API",
        version = "0.3.0",
        description = r#"
# Innkeeper Hotel Booking API

Backend for hotel search, room booking, payment reconciliation, and loyalty
points.

## Authentication

Authenticated endpoints expect a JWT in the Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

Register or log in under `/api/v1/auth` to obtain a token.

## Error Handling

Failed requests return a consistent error payload:

```json
{
  "error": "Not Found",
  "message": "Booking 7a1e... not found",
  "request_id": "d6f0...",
  "timestamp": "2026-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20, max 100).
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Hotels", description = "Catalog search and reviews"),
        (name = "Bookings", description = "Booking lifecycle"),
        (name = "Payments", description = "Gateway orders, verification, and webhooks"),
        (name = "Profile", description = "Traveller profile and dashboard"),
        (name = "Admin", description = "Administrative endpoints")
    ),
    paths(
        crate::handlers::hotels::search_hotels,
        crate::handlers::hotels::featured_hotels,
        crate::handlers::hotels::get_hotel,
        crate::handlers::hotels::list_reviews,
        crate::handlers::hotels::create_review,
        crate::handlers::bookings::create_booking,
        crate::handlers::bookings::list_bookings,
        crate::handlers::bookings::get_booking,
        crate::handlers::bookings::cancel_booking,
        crate::handlers::payments::create_order,
        crate::handlers::payments::verify_payment,
        crate::handlers::payment_webhooks::receive_webhook,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::profile::update_preferences,
        crate::handlers::profile::change_password,
        crate::handlers::profile::user_dashboard,
        crate::handlers::admin::admin_dashboard,
        crate::handlers::admin::list_all_bookings,
        crate::handlers::admin::set_booking_status,
        crate::handlers::admin::delete_booking,
        crate::handlers::admin::create_hotel,
        crate::handlers::admin::update_hotel,
        crate::handlers::admin::delete_hotel,
        crate::handlers::admin::get_settings,
        crate::handlers::admin::update_settings,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::handlers::common::PaginatedResponse<serde_json::Value>,
            crate::entities::hotel::Model,
            crate::entities::hotel::Room,
            crate::entities::booking::Model,
            crate::entities::review::Model,
            crate::entities::setting::Model,
            crate::handlers::hotels::HotelDetail,
            crate::handlers::bookings::CancelBookingRequest,
            crate::handlers::bookings::CancelBookingResponse,
            crate::handlers::payments::CreateOrderRequest,
            crate::handlers::admin::SetBookingStatusRequest,
            crate::handlers::profile::UpdatePreferencesRequest,
            crate::services::catalog::HotelInput,
            crate::services::catalog::ReviewInput,
            crate::services::bookings::CreateBookingRequest,
            crate::services::payments::PaymentOrderResponse,
            crate::services::payments::VerifyPaymentRequest,
            crate::services::profiles::ProfileView,
            crate::services::profiles::UpdateProfileRequest,
            crate::services::settings::UpdateSettingsRequest,
            crate::services::dashboard::UserDashboard,
            crate::services::dashboard::AdminDashboard,
            crate::auth::RegisterRequest,
            crate::auth::LoginRequest,
            crate::auth::ChangePasswordRequest,
            crate::auth::AuthResponse,
            crate::auth::AuthUser,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Innkeeper API"));
        assert!(json.contains("/api/v1/bookings"));
        assert!(json.contains("bearer_auth"));
    }
}
