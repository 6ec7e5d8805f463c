use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;
use uuid::Uuid;

use innkeeper_api::{
    auth::{self, AuthService},
    config::AppConfig,
    db,
    entities::{hotel, user},
    errors::ServiceError,
    events,
    gateway::{GatewayOrder, PaymentGateway},
    handlers::AppServices,
    services::{
        BookingService, CatalogService, DashboardService, PaymentService, ProfileService,
        SettingsService,
    },
    AppState,
};

pub const TEST_JWT_SECRET: &str =
    "integration_test_secret_key_that_is_definitely_longer_than_sixty_four_characters";
pub const TEST_KEY_ID: &str = "rzp_test_fake";
pub const TEST_KEY_SECRET: &str = "test_key_secret";
pub const TEST_WEBHOOK_SECRET: &str = "test_webhook_secret";

/// Gateway stub that fabricates order ids without touching the network.
pub struct FakeGateway {
    pub orders: Mutex<Vec<GatewayOrder>>,
    pub fail: bool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            fail: false,
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ServiceError> {
        if self.fail {
            return Err(ServiceError::ExternalServiceError(
                "gateway down".to_string(),
            ));
        }
        let order = GatewayOrder {
            id: format!("order_test_{}", Uuid::new_v4().simple()),
            amount: amount_minor,
            currency: currency.to_string(),
            receipt: receipt.to_string(),
            status: "created".to_string(),
        };
        self.orders
            .lock()
            .expect("orders lock poisoned")
            .push(order.clone());
        Ok(order)
    }
}

/// HMAC-SHA256 hex digest, for forging valid gateway signatures in tests.
pub fn hmac_sha256_hex(secret: &str, message: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Test application backed by a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_file = format!("innkeeper_test_{}.db", Uuid::new_v4().simple());
        let _ = std::fs::remove_file(&db_file);

        let mut cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.razorpay_key_id = TEST_KEY_ID.to_string();
        cfg.razorpay_key_secret = TEST_KEY_SECRET.to_string();
        cfg.razorpay_webhook_secret = Some(TEST_WEBHOOK_SECRET.to_string());

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db = Arc::new(pool);

        let (event_sender, event_rx) = events::event_channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let gateway = Arc::new(FakeGateway::new());
        let auth = Arc::new(AuthService::new(
            db.clone(),
            cfg.jwt_secret.clone(),
            cfg.jwt_expiration,
        ));

        let services = AppServices {
            catalog: Arc::new(CatalogService::new(db.clone())),
            bookings: Arc::new(BookingService::new(
                db.clone(),
                event_sender.clone(),
                cfg.cancellation_window_hours,
            )),
            payments: Arc::new(PaymentService::new(
                db.clone(),
                gateway.clone(),
                event_sender.clone(),
                cfg.razorpay_key_id.clone(),
                cfg.razorpay_key_secret.clone(),
                cfg.razorpay_webhook_secret.clone(),
                cfg.currency.clone(),
            )),
            profiles: Arc::new(ProfileService::new(db.clone())),
            dashboard: Arc::new(DashboardService::new(db.clone())),
            settings: Arc::new(SettingsService::new(db.clone())),
        };

        let state = AppState {
            db,
            config: cfg,
            event_sender,
            auth,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", innkeeper_api::api_v1_routes(state.clone()))
            .with_state(state.clone());

        Self {
            router,
            state,
            gateway,
            _event_task: event_task,
        }
    }

    /// Inserts a user directly and returns the record with a valid token.
    pub async fn create_user(&self, name: &str, email: &str, role: &str) -> (user::Model, String) {
        let now = Utc::now();
        let saved = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(auth::hash_password("hunter2hunter2").expect("hash password")),
            role: Set(role.to_string()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("insert test user");

        let token = self
            .state
            .auth
            .generate_token(&saved)
            .expect("generate test token");
        (saved, token)
    }

    /// Seeds a hotel with a single room and returns it.
    pub async fn seed_hotel(&self, name: &str, room_id: &str, nightly: Decimal) -> hotel::Model {
        let now = Utc::now();
        hotel::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set("Seeded for integration tests".to_string()),
            images: Set(json!(["https://img.example/hotel.jpg"])),
            city: Set("Jaipur".to_string()),
            state: Set(Some("Rajasthan".to_string())),
            country: Set("India".to_string()),
            address: Set("12 Palace Road".to_string()),
            rating: Set(Decimal::new(45, 1)),
            review_count: Set(3),
            amenities: Set(json!(["wifi", "pool"])),
            rooms: Set(json!([{
                "id": room_id,
                "room_type": "Deluxe",
                "description": "Seeded room",
                "price": nightly.to_string(),
                "max_guests": 2,
                "bed_type": "Queen",
                "available": true,
                "amenities": ["ac"]
            }])),
            price_per_night: Set(nightly),
            featured: Set(true),
            cancellation_policy: Set("Free cancellation up to 24 hours before check-in".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("insert test hotel")
    }

    /// Stay dates far enough out that the cancellation window never trips.
    pub fn stay_dates(days_out: i64, nights: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let check_in = Utc::now() + Duration::days(days_out);
        (check_in, check_in + Duration::days(nights))
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize request body"))
        } else {
            Body::empty()
        };
        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Posts raw bytes with custom headers, for webhook deliveries.
    pub async fn post_raw(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::from(body)).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

/// Reads a response body as JSON, asserting the expected status first.
pub async fn read_json(response: axum::response::Response, expected: StatusCode) -> Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    assert_eq!(
        status,
        expected,
        "unexpected status, body: {}",
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).expect("parse response body")
}
