//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::config::Config;
use api::routes::sessions::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::{OperatorMessage, PaymentPurpose, Reply};
use common::SessionId;
use domain::order::input::{COOKIES_NO, PAY_ONLINE, SKIP_PAYMENT_DEV};
use domain::{Money, OrderState};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const OPERATOR: SessionId = SessionId::new(-100500);

/// Answers of a regular cake order, up to and including the contact.
const REGULAR: [&str; 10] = [
    "Regular cake",
    "Chocolate+Strawberry",
    "2 kg",
    "Color drawing",
    COOKIES_NO,
    "Maria",
    "20.10.2099",
    "no",
    "skip",
    "+79990001122",
];

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn config() -> Config {
    let mut config = Config::for_operator(OPERATOR);
    config.payment_token = Some("test-provider-token".to_string());
    config
}

fn setup_with_config(config: &Config) -> (axum::Router, Arc<AppState>) {
    let state = api::create_default_state(config);
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn setup() -> (axum::Router, Arc<AppState>) {
    setup_with_config(&config())
}

fn setup_developer() -> (axum::Router, Arc<AppState>) {
    let mut config = config();
    config.developer_mode = true;
    setup_with_config(&config)
}

async fn call(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn say(app: &axum::Router, session: i64, text: &str) -> Reply {
    let (status, body) = call(
        app,
        "POST",
        &format!("/sessions/{session}/messages"),
        Some(serde_json::json!({
            "sender": "@maria",
            "input": { "type": "text", "value": text },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).unwrap()
}

async fn walk(app: &axum::Router, session: i64, answers: &[&str]) -> Reply {
    let mut last = say(app, session, "/order").await;
    for answer in answers {
        last = say(app, session, answer).await;
    }
    last
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, body) = call(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let json = json(&body);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["payments_enabled"], true);
    assert_eq!(json["developer_mode"], false);
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_price_list() {
    let (app, _) = setup();

    let (status, body) = call(&app, "GET", "/prices", None).await;

    assert_eq!(status, StatusCode::OK);
    let json = json(&body);
    assert_eq!(json["currency"], "RUB");
    assert_eq!(json["regular_flavors"].as_array().unwrap().len(), 10);
    assert_eq!(json["bento_flavors"].as_array().unwrap().len(), 4);
    assert_eq!(json["regular_flavors"][1]["name"], "Choco-Banana");
    assert_eq!(json["regular_flavors"][1]["price_minor"], 250_000);
    assert_eq!(json["sizes_kg"].as_array().unwrap().len(), 15);
    assert_eq!(json["cookie_price_minor"], 16_000);
    assert!(json["text"].as_str().unwrap().contains("Snickers"));
}

#[tokio::test]
async fn test_order_command_starts_flow() {
    let (app, _) = setup();

    let reply = say(&app, 11, "/order").await;

    assert_eq!(reply.state, OrderState::ChoosingCakeKind);
    assert_eq!(reply.messages.len(), 2);
    assert!(
        reply.messages[1]
            .reply_labels()
            .contains(&"Bento cake (400-450 g)")
    );
}

#[tokio::test]
async fn test_full_order_with_online_payment() {
    let (app, state) = setup();

    let at_payment = walk(&app, 12, &REGULAR).await;
    assert_eq!(at_payment.state, OrderState::ChoosingPaymentMethod);
    assert!(at_payment.last_text().unwrap().contains("5100₽"));

    let invoiced = say(&app, 12, PAY_ONLINE).await;
    let invoice = invoiced.invoice.expect("invoice issued");
    assert_eq!(invoice.amount, Money::from_units(2550));

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/12/payments/pre-checkout",
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["ok"], true);

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/12/payments/success",
        Some(serde_json::json!({
            "payment_id": "PAY-12",
            "purpose": "prepayment",
            "amount_minor": 255_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));

    let confirmed: Reply = serde_json::from_slice(&body).unwrap();
    assert_eq!(confirmed.state, OrderState::Idle);
    let record = confirmed.order.expect("order finalized");
    assert_eq!(record.total(), Money::from_units(5100));
    assert!(record.payment_confirmed());

    let delivered = state.notifications.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(matches!(
        &delivered[0],
        OperatorMessage::Text { destination, .. } if *destination == OPERATOR
    ));
}

#[tokio::test]
async fn test_get_session_snapshot() {
    let (app, _) = setup();
    walk(&app, 13, &REGULAR[..3]).await;

    let (status, body) = call(&app, "GET", "/sessions/13", None).await;

    assert_eq!(status, StatusCode::OK);
    let json = json(&body);
    assert_eq!(json["state"], "ChoosingDecor");
    assert_eq!(json["cake_kind"], "regular");
    assert_eq!(json["flavor"], "Chocolate+Strawberry");
    assert_eq!(json["size_kg"], 2);
    assert_eq!(json["quote"]["base"]["minor"], 460_000);
    assert_eq!(json["quote"]["decor"]["minor"], 0);
    assert!(
        json["prompt"]["quick_replies"]
            .as_array()
            .unwrap()
            .iter()
            .any(|reply| reply["label"] == "Paper print")
    );
}

#[tokio::test]
async fn test_get_unknown_session_returns_404() {
    let (app, _) = setup();

    let (status, _) = call(&app, "GET", "/sessions/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_session_id_returns_400() {
    let (app, _) = setup();

    let (status, body) = call(&app, "GET", "/sessions/not-a-chat", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("not-a-chat"));
}

#[tokio::test]
async fn test_validation_failure_is_a_reprompt() {
    let (app, _) = setup();
    walk(&app, 14, &REGULAR[..5]).await;

    let reply = say(&app, 14, "M").await;

    assert_eq!(reply.state, OrderState::AwaitingRecipientName);
    assert!(reply.last_text().unwrap().contains("at least 2 characters"));
}

#[tokio::test]
async fn test_photo_attachment_input() {
    let (app, _) = setup();
    walk(&app, 15, &REGULAR[..8]).await;

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/15/messages",
        Some(serde_json::json!({
            "input": { "type": "attachment", "value": "photo-file-1" },
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reply: Reply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.state, OrderState::AwaitingContact);
}

#[tokio::test]
async fn test_contact_card_input() {
    let (app, _) = setup();
    walk(&app, 16, &REGULAR[..9]).await;

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/16/messages",
        Some(serde_json::json!({
            "input": { "type": "contact", "value": "+79990001122" },
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reply: Reply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.state, OrderState::ChoosingPaymentMethod);
}

#[tokio::test]
async fn test_malformed_message_body_is_rejected() {
    let (app, _) = setup();

    let (status, _) = call(
        &app,
        "POST",
        "/sessions/17/messages",
        Some(serde_json::json!({ "input": { "type": "sticker", "value": "x" } })),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_pre_checkout_rejected_before_payment_step() {
    let (app, _) = setup();
    walk(&app, 18, &REGULAR[..4]).await;

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/18/payments/pre-checkout",
        Some(serde_json::json!({ "purpose": "prepayment" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["ok"], false);
}

#[tokio::test]
async fn test_payment_success_at_wrong_step_returns_409() {
    let (app, _) = setup();
    walk(&app, 19, &REGULAR[..4]).await;

    let (status, _) = call(
        &app,
        "POST",
        "/sessions/19/payments/success",
        Some(serde_json::json!({
            "payment_id": "PAY-19",
            "purpose": "prepayment",
            "amount_minor": 100_000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_payment_success_without_invoice_returns_409() {
    let (app, state) = setup();
    walk(&app, 27, &REGULAR).await;

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/27/payments/success",
        Some(serde_json::json!({
            "payment_id": "FORGED-27",
            "purpose": "prepayment",
            "amount_minor": 100,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json(&body)["error"].as_str().unwrap().contains("No prepayment"));
    assert_eq!(state.notifications.delivered_count(), 0);
}

#[tokio::test]
async fn test_payment_success_for_unknown_session_returns_404() {
    let (app, state) = setup();

    let (status, _) = call(
        &app,
        "POST",
        "/sessions/28/payments/success",
        Some(serde_json::json!({
            "payment_id": "PAY-28",
            "purpose": "prepayment",
            "amount_minor": 255_000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.coordinator.repository().len().await, 0);
}

#[tokio::test]
async fn test_payment_success_requires_payment_id() {
    let (app, _) = setup();

    let (status, _) = call(
        &app,
        "POST",
        "/sessions/20/payments/success",
        Some(serde_json::json!({
            "payment_id": " ",
            "purpose": "prepayment",
            "amount_minor": 100_000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_without_payment_token_online_payment_is_unavailable() {
    let (app, state) = setup_with_config(&Config::for_operator(OPERATOR));
    walk(&app, 21, &REGULAR).await;

    let reply = say(&app, 21, PAY_ONLINE).await;

    assert_eq!(reply.state, OrderState::ChoosingPaymentMethod);
    assert!(reply.invoice.is_none());
    assert!(state.payment.is_none());
}

#[tokio::test]
async fn test_developer_skip_confirms_without_payment() {
    let (app, state) = setup_developer();
    walk(&app, 22, &REGULAR).await;

    let reply = say(&app, 22, SKIP_PAYMENT_DEV).await;

    assert_eq!(reply.state, OrderState::Idle);
    let record = reply.order.expect("order finalized");
    assert!(!record.payment_confirmed());
    assert_eq!(state.notifications.delivered_count(), 1);
}

#[tokio::test]
async fn test_developer_test_payment_round_trip() {
    let (app, state) = setup_developer();

    let reply = say(&app, 23, "/dev_paytest 500").await;
    let invoice = reply.invoice.expect("test invoice issued");
    assert_eq!(invoice.purpose, PaymentPurpose::DevTest);
    assert_eq!(invoice.amount, Money::from_units(500));
    assert_eq!(state.payment.as_ref().unwrap().invoice_count(), 1);

    let (_, body) = call(
        &app,
        "POST",
        "/sessions/23/payments/pre-checkout",
        Some(serde_json::json!({ "purpose": "dev_test" })),
    )
    .await;
    assert_eq!(json(&body)["ok"], true);

    let (status, body) = call(
        &app,
        "POST",
        "/sessions/23/payments/success",
        Some(serde_json::json!({
            "payment_id": "TEST-23",
            "purpose": "dev_test",
            "amount_minor": 50_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reply: Reply = serde_json::from_slice(&body).unwrap();
    assert!(reply.order.is_none());
    assert!(reply.last_text().unwrap().contains("500₽"));
}

#[tokio::test]
async fn test_dev_test_pre_checkout_rejected_outside_developer_mode() {
    let (app, _) = setup();

    let (_, body) = call(
        &app,
        "POST",
        "/sessions/24/payments/pre-checkout",
        Some(serde_json::json!({ "purpose": "dev_test" })),
    )
    .await;

    assert_eq!(json(&body)["ok"], false);
}

#[tokio::test]
async fn test_session_reaper_expires_abandoned_orders() {
    let mut config = config();
    config.session_ttl = Some(Duration::from_millis(20));
    let (app, state) = setup_with_config(&config);
    walk(&app, 25, &REGULAR[..2]).await;

    let reaper = api::spawn_session_reaper(state.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(200)).await;
    reaper.abort();

    let session_state = state
        .coordinator
        .session(SessionId::new(25))
        .await
        .map(|s| s.state())
        .unwrap_or_default();
    assert_eq!(session_state, OrderState::Idle);
    assert_eq!(state.coordinator.repository().len().await, 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    walk(&app, 26, &REGULAR[..1]).await;

    let (status, body) = call(&app, "GET", "/metrics", None).await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("orders_started_total"));
}
