//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use staybook::api::AppState;
use staybook::config::Config;
use staybook::db::NewHotelRoom;
use staybook::services::{CheckoutRequest, CheckoutSession, Notifier, PaymentGateway};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "Str0ng!Passw0rd";
pub const WEBHOOK_SECRET: &str = "whsec_integration_test";

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages_to(&self, to: &str) -> Vec<SentMail> {
        self.messages().into_iter().filter(|m| m.to == to).collect()
    }

    /// The six-digit code in the most recent message to `to`.
    pub fn last_code_for(&self, to: &str) -> String {
        let re = regex::Regex::new(r"<b>(\d{6})</b>").unwrap();
        self.messages_to(to)
            .iter()
            .rev()
            .find_map(|m| re.captures(&m.body).map(|c| c[1].to_string()))
            .unwrap_or_else(|| panic!("no code sent to {to}"))
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Always fails, for checking that mail errors never break a flow.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        anyhow::bail!("smtp unavailable")
    }
}

#[derive(Default)]
pub struct FakeGateway {
    requests: Mutex<Vec<CheckoutRequest>>,
}

impl FakeGateway {
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> anyhow::Result<CheckoutSession> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(CheckoutSession {
            id: format!("cs_test_{}", request.booking_id),
            url: Some(format!("https://checkout.test/{}", request.booking_id)),
        })
    }
}

/// Points at a fresh database inside `dir`.
pub fn test_config(dir: &TempDir) -> Config {
    let db_path = dir.path().join("staybook.db");

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = "integration-test-secret-with-32-bytes!".to_string();
    config.security.encryption_key = "0f".repeat(32);
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config.payments.webhook_secret = WEBHOOK_SECRET.to_string();
    config
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<FakeGateway>,
    // Declared last so the database is closed before the directory goes.
    _db_dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like `spawn_app`, with a chance to adjust the config first.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let db_dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = test_config(&db_dir);
    configure(&mut config);

    let notifier = Arc::new(RecordingNotifier::default());
    let gateway = Arc::new(FakeGateway::default());

    let state = staybook::api::create_app_state_with_collaborators(
        config,
        notifier.clone(),
        gateway.clone(),
        None,
    )
    .await
    .expect("failed to create app state");

    let router = staybook::api::router(state.clone());

    TestApp {
        state,
        router,
        notifier,
        gateway,
        _db_dir: db_dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Registers a user and completes the OTP step, returning `(user_id, token)`.
    pub async fn register_and_login(&self, username: &str, email: &str) -> (i32, String) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": email,
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                    "phone": "+1 555-123-4567",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let user_id = i32::try_from(body["data"]["user_id"].as_i64().unwrap()).unwrap();

        let code = self.notifier.last_code_for(email);
        let (status, body) = self
            .post(
                "/api/auth/verify-login-otp",
                None,
                json!({ "user_id": user_id, "otp": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {body}");

        (user_id, body["data"]["token"].as_str().unwrap().to_string())
    }

    /// Creates an admin directly and logs in; admins skip the OTP step.
    pub async fn admin_token(&self, email: &str) -> String {
        self.state
            .shared
            .auth_service
            .create_account(staybook::services::NewAccount {
                username: "admin".to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                role: staybook::models::Role::Admin,
                phone: None,
            })
            .await
            .expect("create admin");

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn seed_room(&self) -> i32 {
        self.state
            .store()
            .add_hotel_room(NewHotelRoom {
                title: "Deluxe King".to_string(),
                description: Some("Sea view".to_string()),
                hotel_name: "Grand Harbor".to_string(),
                location: "Lisbon".to_string(),
                price_per_night_cents: 18_000,
            })
            .await
            .expect("seed room")
            .id
    }

    /// Creates a two-night booking starting tomorrow and returns its id.
    pub async fn create_booking(&self, token: &str, room_id: i32) -> i32 {
        let check_in = chrono::Utc::now() + chrono::Duration::days(1);
        let check_out = check_in + chrono::Duration::days(2);

        let (status, body) = self
            .post(
                "/api/bookings",
                Some(token),
                json!({
                    "hotel_room_id": room_id,
                    "check_in_date": check_in.to_rfc3339(),
                    "check_out_date": check_out.to_rfc3339(),
                    "guests": 2,
                    "rooms": 1,
                    "total_price_cents": 36_000,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create booking failed: {body}");
        i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap()
    }
}

/// A signed `checkout.session.completed` delivery for `booking_id`.
pub fn checkout_completed_request(event_id: &str, booking_id: i32) -> Request<Body> {
    let payload = json!({
        "id": event_id,
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_test", "metadata": { "booking_id": booking_id.to_string() } } }
    })
    .to_string();

    signed_webhook_request(&payload)
}

pub fn signed_webhook_request(payload: &str) -> Request<Body> {
    let header = staybook::services::webhook::signature_header(
        WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
        payload.as_bytes(),
    )
    .unwrap();

    Request::builder()
        .method(Method::POST)
        .uri("/api/payments/webhook")
        .header("Content-Type", "application/json")
        .header("Stripe-Signature", header)
        .body(Body::from(payload.to_string()))
        .unwrap()
}
