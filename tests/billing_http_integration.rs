//! Integration tests for billing HTTP endpoints.
//!
//! Drives the full router (auth middleware, handlers, synchronizer) against
//! the in-memory store and the mock payment provider:
//! 1. Checkout session creation and its failure responses
//! 2. Post-checkout landing redirects
//! 3. Webhook intake: signature, allow-list, customer extraction, sync
//! 4. Snapshot read endpoint

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use billing_sync::adapters::auth::MockSessionValidator;
use billing_sync::adapters::http::billing::STRIPE_SIGNATURE_HEADER;
use billing_sync::adapters::http::{app_router, BillingAppState, CheckoutSettings};
use billing_sync::adapters::memory::InMemoryBillingStore;
use billing_sync::adapters::stripe::MockPaymentProvider;
use billing_sync::domain::billing::{CardSummary, CustomerLink, StripeWebhookVerifier};
use billing_sync::domain::foundation::{CustomerId, UserId};
use billing_sync::ports::{CheckoutSession, PaymentError, Subscription};

// =============================================================================
// Test Infrastructure
// =============================================================================

const WEBHOOK_SECRET: &str = "whsec_integration";
const PUBLIC_URL: &str = "https://app.example.com";
const TOKEN: &str = "token-ada";

struct TestApp {
    router: Router,
    store: InMemoryBillingStore,
    provider: MockPaymentProvider,
    verifier: Arc<StripeWebhookVerifier>,
}

impl TestApp {
    fn new() -> Self {
        let store = InMemoryBillingStore::new();
        let provider = MockPaymentProvider::new();
        let verifier = Arc::new(StripeWebhookVerifier::new(WEBHOOK_SECRET));

        let state = BillingAppState {
            customer_links: Arc::new(store.clone()),
            subscriptions: Arc::new(store.clone()),
            payment_provider: Arc::new(provider.clone()),
            webhook_verifier: verifier.clone(),
            settings: CheckoutSettings {
                price_id: "price_pro_monthly".to_string(),
                public_url: PUBLIC_URL.to_string(),
                require_livemode: false,
            },
        };
        let validator = Arc::new(MockSessionValidator::new().with_test_user(TOKEN, "user-ada"));

        Self {
            router: app_router(state, validator),
            store,
            provider,
            verifier,
        }
    }

    fn link(&self, user: &str, customer: &str) {
        self.store.seed_link(CustomerLink::new(
            UserId::new(user).unwrap(),
            CustomerId::new(customer).unwrap(),
        ));
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        (status, headers, body)
    }

    fn signed_webhook(&self, event: &Value) -> Request<Body> {
        let payload = serde_json::to_vec(event).unwrap();
        let signature = self
            .verifier
            .signature_header(chrono::Utc::now().timestamp(), &payload)
            .unwrap();
        webhook_request(payload, Some(signature))
    }
}

fn webhook_request(payload: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header(STRIPE_SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(payload)).unwrap()
}

fn authed(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap()
}

fn event(event_type: &str, object: Value) -> Value {
    json!({
        "id": "evt_test",
        "object": "event",
        "type": event_type,
        "livemode": false,
        "created": 1_700_000_000,
        "data": { "object": object }
    })
}

fn active_subscription(customer: &str) -> Subscription {
    Subscription {
        id: "sub_1".to_string(),
        customer_id: customer.to_string(),
        status: "active".to_string(),
        price_id: Some("price_pro_monthly".to_string()),
        current_period_start: Some(1_697_408_000),
        current_period_end: Some(1_700_000_000),
        cancel_at_period_end: false,
        card: Some(CardSummary {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
        }),
    }
}

fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

// =============================================================================
// Checkout Initiator
// =============================================================================

#[tokio::test]
async fn checkout_links_customer_and_returns_session_id() {
    let app = TestApp::new();
    app.provider.set_next_customer_id("cus_123");
    app.provider.set_checkout_session(CheckoutSession {
        id: "cs_456".to_string(),
        url: Some("https://checkout.stripe.com/c/cs_456".to_string()),
    });

    let (status, _, body) = app
        .send(authed("POST", "/api/billing/checkout-session"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"sessionId": "cs_456"}));

    let link = app.store.link_count();
    assert_eq!(link, 1);
    let calls = app.provider.calls();
    let checkout = calls
        .iter()
        .find(|c| c.method == "create_checkout_session")
        .unwrap();
    assert_eq!(checkout.args, vec!["cus_123", "price_pro_monthly"]);
}

#[tokio::test]
async fn checkout_reuses_existing_link() {
    let app = TestApp::new();
    app.link("user-ada", "cus_existing");

    let (status, _, _) = app
        .send(authed("POST", "/api/billing/checkout-session"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!app.provider.was_called("create_customer"));
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/billing/checkout-session")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn checkout_customer_failure_is_generic_500() {
    let app = TestApp::new();
    app.provider.set_method_error(
        "create_customer",
        PaymentError::provider("api_key_expired: secret detail"),
    );

    let (status, _, body) = app
        .send(authed("POST", "/api/billing/checkout-session"))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Failed to create customer"}));
    assert_eq!(app.store.link_count(), 0);
}

#[tokio::test]
async fn checkout_session_failure_is_400_with_provider_message() {
    let app = TestApp::new();
    app.provider.set_method_error(
        "create_checkout_session",
        PaymentError::invalid_request("No such price: 'price_pro_monthly'"),
    );

    let (status, _, body) = app
        .send(authed("POST", "/api/billing/checkout-session"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&body),
        json!({"error": "No such price: 'price_pro_monthly'"})
    );
}

// =============================================================================
// Post-Checkout Lander
// =============================================================================

#[tokio::test]
async fn success_without_session_redirects_home() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/billing/success")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = app.send(request).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "https://app.example.com/");
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn success_with_invalid_token_redirects_home() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/billing/success")
        .header(header::AUTHORIZATION, "Bearer expired-or-unknown")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = app.send(request).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "https://app.example.com/");
    assert!(body.is_empty());
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn checkout_with_invalid_token_is_401() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/billing/checkout-session")
        .header(header::AUTHORIZATION, "Bearer expired-or-unknown")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn success_syncs_and_redirects_home() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_subscriptions("cus_123", vec![active_subscription("cus_123")]);

    let (status, headers, _) = app.send(authed("GET", "/api/billing/success")).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "https://app.example.com/");
    let stored = app
        .store
        .snapshot(&CustomerId::new("cus_123").unwrap())
        .unwrap();
    assert_eq!(stored.status.as_str(), "active");
}

#[tokio::test]
async fn success_sync_failure_redirects_to_error_page() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_method_error("list_subscriptions", PaymentError::network("timeout"));

    let (status, headers, _) = app.send(authed("GET", "/api/billing/success")).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        headers[header::LOCATION],
        "https://app.example.com/billing/error"
    );
}

// =============================================================================
// Webhook Intake
// =============================================================================

#[tokio::test]
async fn subscription_updated_syncs_latest_state() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_subscriptions("cus_123", vec![active_subscription("cus_123")]);

    let request = app.signed_webhook(&event(
        "customer.subscription.updated",
        json!({"id": "sub_1", "object": "subscription", "customer": "cus_123", "status": "past_due"}),
    ));
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"received": true}));

    // The stored state comes from the provider fetch, not the event payload
    let stored = app
        .store
        .snapshot(&CustomerId::new("cus_123").unwrap())
        .unwrap();
    assert_eq!(stored.status.as_str(), "active");
    assert_eq!(
        stored.current_period_end.map(|t| t.as_unix_secs()),
        Some(1_700_000_000)
    );
}

#[tokio::test]
async fn untracked_event_is_acknowledged_without_writes() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");

    let request = app.signed_webhook(&event(
        "invoice.created",
        json!({"object": "invoice", "customer": "cus_123"}),
    ));
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"received": true}));
    assert_eq!(app.store.snapshot_write_count(), 0);
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn tampered_payload_is_rejected_with_empty_body() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_subscriptions("cus_123", vec![active_subscription("cus_123")]);

    let original = serde_json::to_vec(&event(
        "customer.subscription.updated",
        json!({"customer": "cus_123"}),
    ))
    .unwrap();
    let signature = app
        .verifier
        .signature_header(chrono::Utc::now().timestamp(), &original)
        .unwrap();
    let tampered = String::from_utf8(original)
        .unwrap()
        .replace("cus_123", "cus_999")
        .into_bytes();

    let (status, _, body) = app
        .send(webhook_request(tampered, Some(signature)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
    assert_eq!(app.store.snapshot_write_count(), 0);
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let app = TestApp::new();
    let payload = serde_json::to_vec(&event("invoice.paid", json!({"customer": "cus_123"}))).unwrap();

    let (status, _, body) = app.send(webhook_request(payload, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn stale_signature_is_rejected() {
    let app = TestApp::new();
    let payload = serde_json::to_vec(&event("invoice.paid", json!({"customer": "cus_123"}))).unwrap();
    let signature = app
        .verifier
        .signature_header(chrono::Utc::now().timestamp() - 3_600, &payload)
        .unwrap();

    let (status, _, _) = app.send(webhook_request(payload, Some(signature))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_without_customer_is_acknowledged_without_sync() {
    let app = TestApp::new();

    let request = app.signed_webhook(&event(
        "payment_intent.succeeded",
        json!({"id": "pi_1", "object": "payment_intent"}),
    ));
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"received": true}));
    assert!(!app.provider.was_called("list_subscriptions"));
}

#[tokio::test]
async fn event_with_expanded_customer_object_is_acknowledged_without_sync() {
    let app = TestApp::new();

    let request = app.signed_webhook(&event(
        "invoice.paid",
        json!({"object": "invoice", "customer": {"id": "cus_123", "object": "customer"}}),
    ));
    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!app.provider.was_called("list_subscriptions"));
}

#[tokio::test]
async fn sync_error_returns_400() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_method_error("list_subscriptions", PaymentError::network("reset"));

    let request = app.signed_webhook(&event("invoice.paid", json!({"customer": "cus_123"})));
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
    assert_eq!(app.store.snapshot_write_count(), 0);
}

#[tokio::test]
async fn repeated_deliveries_store_identical_snapshots() {
    let app = TestApp::new();
    let customer = CustomerId::new("cus_123").unwrap();
    app.link("user-ada", "cus_123");
    app.provider
        .set_subscriptions("cus_123", vec![active_subscription("cus_123")]);

    let delivery = event("invoice.paid", json!({"customer": "cus_123"}));
    app.send(app.signed_webhook(&delivery)).await;
    let first = serde_json::to_vec(&app.store.snapshot(&customer).unwrap()).unwrap();
    app.send(app.signed_webhook(&delivery)).await;
    let second = serde_json::to_vec(&app.store.snapshot(&customer).unwrap()).unwrap();

    assert_eq!(app.store.snapshot_write_count(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn deleted_subscription_clears_snapshot() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_subscriptions("cus_123", vec![active_subscription("cus_123")]);
    let request = app.signed_webhook(&event(
        "customer.subscription.created",
        json!({"customer": "cus_123"}),
    ));
    app.send(request).await;

    app.provider.clear_subscriptions("cus_123");
    let request = app.signed_webhook(&event(
        "customer.subscription.deleted",
        json!({"customer": "cus_123"}),
    ));
    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    let stored = app
        .store
        .snapshot(&CustomerId::new("cus_123").unwrap())
        .unwrap();
    assert!(stored.status.is_none());
    assert!(stored.subscription_id.is_none());
    assert!(stored.payment_method.is_none());
    assert!(stored.current_period_end.is_none());
}

// =============================================================================
// Snapshot Read + Health
// =============================================================================

#[tokio::test]
async fn subscription_endpoint_returns_none_shape_before_checkout() {
    let app = TestApp::new();

    let (status, _, body) = app.send(authed("GET", "/api/billing/subscription")).await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["status"], "none");
    assert_eq!(body["hasAccess"], false);
}

#[tokio::test]
async fn subscription_endpoint_returns_synced_snapshot() {
    let app = TestApp::new();
    app.link("user-ada", "cus_123");
    app.provider
        .set_subscriptions("cus_123", vec![active_subscription("cus_123")]);
    app.send(authed("GET", "/api/billing/success")).await;

    let (status, _, body) = app.send(authed("GET", "/api/billing/subscription")).await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["status"], "active");
    assert_eq!(body["currentPeriodEnd"], 1_700_000_000);
    assert_eq!(body["paymentMethod"]["last4"], "4242");
    assert_eq!(body["hasAccess"], true);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"status": "ok"}));
}
