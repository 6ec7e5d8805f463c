mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{read_json, TestApp};

#[tokio::test]
async fn catalog_search_filters_by_city_and_price() {
    let app = TestApp::new().await;
    app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    app.seed_hotel("Budget Inn", "std", dec!(800)).await;

    // Both seeded hotels are in Jaipur.
    let response = app
        .request(Method::GET, "/api/v1/hotels?city=Jaipur", None, None)
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["pagination"]["total"], 2);

    let response = app
        .request(Method::GET, "/api/v1/hotels?min_price=1000", None, None)
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["name"], "Palace View");

    let response = app
        .request(Method::GET, "/api/v1/hotels?city=Mumbai", None, None)
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn catalog_rejects_inverted_price_range() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::GET,
            "/api/v1/hotels?min_price=500&max_price=100",
            None,
            None,
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn review_updates_hotel_rating_in_step() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/hotels/{}/reviews", hotel.id),
            Some(json!({ "rating": 5, "comment": "Lovely stay" })),
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["user_name"], "Asha");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/hotels/{}", hotel.id),
            None,
            None,
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    // Seeded at 4.5 over 3 reviews; (4.5 * 3 + 5) / 4 = 4.63 (2 dp).
    assert_eq!(body["data"]["review_count"], 4);
    assert_eq!(body["data"]["reviews"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_endpoints_require_admin_role() {
    let app = TestApp::new().await;
    let (_, user_token) = app.create_user("Asha", "asha@example.com", "user").await;

    let response = app
        .request(Method::GET, "/api/v1/admin/dashboard", None, Some(&user_token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(Method::GET, "/api/v1/admin/dashboard", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_dashboard_aggregates_counts_and_revenue() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, user_token) = app.create_user("Asha", "asha@example.com", "user").await;
    let (_, admin_token) = app.create_user("Root", "root@example.com", "admin").await;

    let (check_in, check_out) = TestApp::stay_dates(10, 2);
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel.id,
                "room_id": "dlx",
                "check_in": check_in,
                "check_out": check_out,
                "guests": 1
            })),
            Some(&user_token),
        )
        .await;
    read_json(response, StatusCode::CREATED).await;

    let response = app
        .request(Method::GET, "/api/v1/admin/dashboard", None, Some(&admin_token))
        .await;
    let body = read_json(response, StatusCode::OK).await;
    let data = &body["data"];
    assert_eq!(data["total_users"], 2);
    assert_eq!(data["total_hotels"], 1);
    assert_eq!(data["total_bookings"], 1);
    assert_eq!(data["bookings_by_status"]["Confirmed"], 1);
    assert_eq!(data["recent_bookings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_manages_hotels_and_status_overrides() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("Root", "root@example.com", "admin").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/hotels",
            Some(json!({
                "name": "New Heights",
                "description": "Opened via admin API",
                "city": "Mumbai",
                "country": "India",
                "address": "9 Marine Drive",
                "price_per_night": "4200",
                "rooms": [{
                    "id": "std",
                    "room_type": "Standard",
                    "price": "4200",
                    "max_guests": 2
                }]
            })),
            Some(&admin_token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let hotel_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["review_count"], 0);

    // Booking against it, then an operator override to Completed.
    let (_, user_token) = app.create_user("Asha", "asha@example.com", "user").await;
    let (check_in, check_out) = TestApp::stay_dates(10, 1);
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel_id,
                "room_id": "std",
                "check_in": check_in,
                "check_out": check_out,
                "guests": 2
            })),
            Some(&user_token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/bookings/{}/status", booking_id),
            Some(json!({ "status": "Completed" })),
            Some(&admin_token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "Completed");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/bookings/{}/status", booking_id),
            Some(json!({ "status": "Teleported" })),
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    // Delete the hotel; detail reads now 404.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/hotels/{}", hotel_id),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/hotels/{}", hotel_id),
            None,
            None,
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn admin_overrides_payment_status_and_deletes_bookings() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, user_token) = app.create_user("Asha", "asha@example.com", "user").await;
    let (_, admin_token) = app.create_user("Root", "root@example.com", "admin").await;

    let (check_in, check_out) = TestApp::stay_dates(10, 2);
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel.id,
                "room_id": "dlx",
                "check_in": check_in,
                "check_out": check_out,
                "guests": 1
            })),
            Some(&user_token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    // Reconcile an offline payment: flip both statuses in one override.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/bookings/{}/status", booking_id),
            Some(json!({ "status": "Completed", "payment_status": "Paid" })),
            Some(&admin_token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "Completed");
    assert_eq!(body["data"]["payment_status"], "Paid");

    // Regular users cannot delete bookings.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/bookings/{}", booking_id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/bookings/{}", booking_id),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone for the owner, and a second delete reports not found.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/bookings/{}", booking_id),
            None,
            Some(&user_token),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/bookings/{}", booking_id),
            None,
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn settings_round_trip_through_admin_api() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.create_user("Root", "root@example.com", "admin").await;

    // Defaults are served before any row exists.
    let response = app
        .request(Method::GET, "/api/v1/admin/settings", None, Some(&admin_token))
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["currency"], "INR");

    let response = app
        .request(
            Method::PUT,
            "/api/v1/admin/settings",
            Some(json!({
                "site_name": "Innkeeper Staging",
                "support_email": "help@innkeeper.example",
                "currency": "INR",
                "tax_rate": "12",
                "cancellation_window_hours": 48,
                "maintenance_mode": false
            })),
            Some(&admin_token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["site_name"], "Innkeeper Staging");
    assert_eq!(body["data"]["cancellation_window_hours"], 48);
}

#[tokio::test]
async fn auth_register_login_and_me() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "name": "Asha",
                "email": "asha@example.com",
                "password": "correct horse battery"
            })),
            None,
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "user");

    // Duplicate registration conflicts.
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "name": "Asha",
                "email": "asha@example.com",
                "password": "correct horse battery"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request(Method::GET, "/api/v1/auth/me", None, Some(&token))
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["email"], "asha@example.com");

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({
                "email": "asha@example.com",
                "password": "wrong password"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({
                "email": "asha@example.com",
                "password": "correct horse battery"
            })),
            None,
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert!(body["token"].as_str().is_some());
}
