mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{read_json, TestApp};

#[tokio::test]
async fn booking_creation_prices_stay_and_credits_loyalty() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;

    let (check_in, check_out) = TestApp::stay_dates(10, 3);
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel.id,
                "room_id": "dlx",
                "check_in": check_in,
                "check_out": check_out,
                "guests": 2
            })),
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;

    assert!(body["success"].as_bool().unwrap());
    let booking = &body["data"];
    assert_eq!(booking["status"], "Confirmed");
    // Checkout precedes submission, so a fresh booking is already paid.
    assert_eq!(booking["payment_status"], "Paid");
    // 3 nights at 2000.
    assert_eq!(booking["price"].as_str().map(str::to_string), Some("6000".to_string()));
    assert_eq!(booking["hotel_name"], "Palace View");
    assert_eq!(booking["location"], "Jaipur, India");

    // Loyalty credit lands in the same transaction: floor(6000 / 10).
    let response = app
        .request(Method::GET, "/api/v1/profile", None, Some(&token))
        .await;
    let profile = read_json(response, StatusCode::OK).await;
    assert_eq!(profile["data"]["loyalty_points"], 600);
}

#[tokio::test]
async fn booking_rejects_inverted_dates_and_overflow_guests() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;

    let (check_in, check_out) = TestApp::stay_dates(10, 3);
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel.id,
                "room_id": "dlx",
                "check_in": check_out,
                "check_out": check_in,
                "guests": 2
            })),
            Some(&token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    // Room sleeps 2.
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel.id,
                "room_id": "dlx",
                "check_in": check_in,
                "check_out": check_out,
                "guests": 5
            })),
            Some(&token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn booking_unknown_room_is_not_found() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;

    let (check_in, check_out) = TestApp::stay_dates(10, 2);
    let response = app
        .request(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({
                "hotel_id": hotel.id,
                "room_id": "penthouse",
                "check_in": check_in,
                "check_out": check_out,
                "guests": 1
            })),
            Some(&token),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn booking_requires_authentication() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;

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
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cancellation_respects_window_then_succeeds_once() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;

    // Booking that checks in far in the future: cancellable.
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
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(json!({ "reason": "change of plans" })),
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "Cancelled");
    assert_eq!(body["data"]["cancellation_reason"], "change of plans");
    assert_eq!(body["data"]["payment_status"], "Refunded");
    // The full stay price comes back: 2 nights at 2000.
    assert_eq!(body["data"]["refund_amount"].as_str(), Some("4000"));

    // Second cancel is rejected, not silently repeated.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(json!({})),
            Some(&token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn cancellation_inside_window_is_a_policy_violation() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;

    // Check-in only six hours away, inside the 24 hour window.
    let check_in = Utc::now() + Duration::hours(6);
    let check_out = check_in + Duration::days(1);
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
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(json!({})),
            Some(&token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    // Admins are exempt from the window.
    let (_, admin_token) = app.create_user("Root", "root@example.com", "admin").await;
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(json!({ "reason": "operator override" })),
            Some(&admin_token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "Cancelled");
}

#[tokio::test]
async fn concurrent_cancellations_succeed_exactly_once() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (user, token) = app.create_user("Asha", "asha@example.com", "user").await;

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
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // Two racing cancels: the version-guarded update lets one through and
    // the loser gets an error instead of a second refund.
    let svc = app.state.services.bookings.clone();
    let (first, second) = tokio::join!(
        svc.cancel_booking(booking_id, user.id, false, None),
        svc.cancel_booking(booking_id, user.id, false, None)
    );
    let successes = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/bookings/{}", booking_id),
            None,
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "Cancelled");
    assert_eq!(body["data"]["payment_status"], "Refunded");
}

#[tokio::test]
async fn cancellation_window_follows_admin_settings() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, token) = app.create_user("Asha", "asha@example.com", "user").await;
    let (_, admin_token) = app.create_user("Root", "root@example.com", "admin").await;

    // Check-in thirty hours away: outside the default 24 hour window.
    let check_in = Utc::now() + Duration::hours(30);
    let check_out = check_in + Duration::days(1);
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
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let set_window = |hours: i64| {
        json!({
            "site_name": "Innkeeper",
            "support_email": "help@innkeeper.example",
            "currency": "INR",
            "tax_rate": "12",
            "cancellation_window_hours": hours,
            "maintenance_mode": false
        })
    };

    // Widening the window to 48 hours puts this booking inside it.
    let response = app
        .request(
            Method::PUT,
            "/api/v1/admin/settings",
            Some(set_window(48)),
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::OK).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(json!({})),
            Some(&token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    // Narrowing it back below thirty hours frees the cancellation.
    let response = app
        .request(
            Method::PUT,
            "/api/v1/admin/settings",
            Some(set_window(12)),
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::OK).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(json!({})),
            Some(&token),
        )
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "Cancelled");
}

#[tokio::test]
async fn bookings_are_hidden_from_other_users() {
    let app = TestApp::new().await;
    let hotel = app.seed_hotel("Palace View", "dlx", dec!(2000)).await;
    let (_, owner_token) = app.create_user("Asha", "asha@example.com", "user").await;
    let (_, other_token) = app.create_user("Vik", "vik@example.com", "user").await;

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
            Some(&owner_token),
        )
        .await;
    let body = read_json(response, StatusCode::CREATED).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/bookings/{}", booking_id),
            None,
            Some(&other_token),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;

    // The owner's list contains it, the other user's does not.
    let response = app
        .request(Method::GET, "/api/v1/bookings", None, Some(&owner_token))
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);

    let response = app
        .request(Method::GET, "/api/v1/bookings", None, Some(&other_token))
        .await;
    let body = read_json(response, StatusCode::OK).await;
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 0);
}
