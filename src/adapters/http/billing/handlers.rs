//! HTTP handlers for billing endpoints.
//!
//! These handlers connect axum routes to the billing command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::application::handlers::billing::{
    CompleteCheckoutHandler, GetSubscriptionHandler, GetSubscriptionQuery, HandleWebhookCommand,
    HandleWebhookHandler, ResolveCustomerLinkHandler, StartCheckoutCommand, StartCheckoutHandler,
    SubscriptionSynchronizer, WebhookFailure,
};
use crate::domain::billing::{BillingError, StripeWebhookVerifier};
use crate::ports::{CustomerLinkRepository, PaymentProvider, SubscriptionRepository};

use super::dto::{CheckoutSessionResponse, ErrorResponse, SubscriptionResponse, WebhookAck};

/// Header carrying the webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Where checkout sends the customer and what it sells.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Recurring price sold by every checkout session.
    pub price_id: String,

    /// Base application URL without trailing slash.
    pub public_url: String,

    /// Reject test-mode webhook events.
    pub require_livemode: bool,
}

impl CheckoutSettings {
    pub fn home_url(&self) -> String {
        format!("{}/", self.public_url)
    }

    pub fn error_url(&self) -> String {
        format!("{}/billing/error", self.public_url)
    }

    pub fn success_url(&self) -> String {
        format!("{}/api/billing/success", self.public_url)
    }

    pub fn cancel_url(&self) -> String {
        self.home_url()
    }
}

/// Shared state for billing routes. Cloned per request; all fields are cheap to clone.
#[derive(Clone)]
pub struct BillingAppState {
    pub customer_links: Arc<dyn CustomerLinkRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub settings: CheckoutSettings,
}

impl BillingAppState {
    fn resolver(&self) -> Arc<ResolveCustomerLinkHandler> {
        Arc::new(ResolveCustomerLinkHandler::new(
            self.customer_links.clone(),
            self.payment_provider.clone(),
        ))
    }

    fn synchronizer(&self) -> Arc<SubscriptionSynchronizer> {
        Arc::new(SubscriptionSynchronizer::new(
            self.customer_links.clone(),
            self.subscriptions.clone(),
            self.payment_provider.clone(),
        ))
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(self.resolver(), self.payment_provider.clone())
    }

    pub fn complete_checkout_handler(&self) -> CompleteCheckoutHandler {
        CompleteCheckoutHandler::new(self.resolver(), self.synchronizer())
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        HandleWebhookHandler::new(self.webhook_verifier.clone(), self.synchronizer())
            .with_require_livemode(self.settings.require_livemode)
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.customer_links.clone(), self.subscriptions.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/checkout-session
pub async fn create_checkout_session(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CheckoutSessionResponse>, BillingApiError> {
    let handler = state.start_checkout_handler();
    let session = handler
        .handle(StartCheckoutCommand {
            user,
            price_id: state.settings.price_id.clone(),
            success_url: state.settings.success_url(),
            cancel_url: state.settings.cancel_url(),
        })
        .await?;

    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
    }))
}

/// GET /api/billing/success
///
/// Always answers with a 302; the target depends on whether the eager sync
/// went through.
pub async fn checkout_success(
    State(state): State<BillingAppState>,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    let Some(user) = user else {
        return found(&state.settings.home_url());
    };

    match state.complete_checkout_handler().handle(&user).await {
        Ok(_) => found(&state.settings.home_url()),
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Post-checkout sync failed");
            found(&state.settings.error_url())
        }
    }
}

/// GET /api/billing/subscription
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<SubscriptionResponse>, BillingApiError> {
    let result = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery { user_id: user.id })
        .await?;

    Ok(Json(result.into()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhooks
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "Webhook acknowledged");
            (StatusCode::OK, Json(WebhookAck::received())).into_response()
        }
        // Both failures answer with an empty 400 so the provider retries.
        Err(WebhookFailure::Rejected(e)) => e.status_code().into_response(),
        Err(WebhookFailure::SyncFailed(_)) => StatusCode::BAD_REQUEST.into_response(),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Health
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BillingError::CustomerProvisioningFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create customer".to_string(),
            ),
            BillingError::CheckoutFailed(message) => (StatusCode::BAD_REQUEST, message.clone()),
            BillingError::Provider(_) | BillingError::CustomerMismatch { .. } => (
                StatusCode::BAD_GATEWAY,
                "Billing provider error".to_string(),
            ),
            BillingError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Billing request failed");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
