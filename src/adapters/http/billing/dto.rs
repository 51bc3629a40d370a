//! Request/response DTOs for billing endpoints.
//!
//! Field names are camelCase to match what the browser client reads
//! (`sessionId`, `received`).

use serde::{Deserialize, Serialize};

use crate::application::GetSubscriptionResult;
use crate::domain::billing::{CardSummary, SubscriptionSnapshot, SubscriptionStatus};

/// `POST /api/billing/checkout-session` success body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMethodResponse {
    pub brand: String,
    pub last4: String,
}

impl From<CardSummary> for PaymentMethodResponse {
    fn from(card: CardSummary) -> Self {
        Self {
            brand: card.brand,
            last4: card.last4,
        }
    }
}

/// `GET /api/billing/subscription` body. Periods are Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub status: String,
    pub subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub payment_method: Option<PaymentMethodResponse>,
    pub has_access: bool,
}

impl SubscriptionResponse {
    /// Shape returned when nothing has been synced for the account.
    pub fn none() -> Self {
        Self {
            status: SubscriptionStatus::NONE.to_string(),
            subscription_id: None,
            price_id: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            payment_method: None,
            has_access: false,
        }
    }
}

impl From<SubscriptionSnapshot> for SubscriptionResponse {
    fn from(snapshot: SubscriptionSnapshot) -> Self {
        Self {
            has_access: snapshot.status.grants_access(),
            status: snapshot.status.as_str().to_string(),
            subscription_id: snapshot.subscription_id,
            price_id: snapshot.price_id,
            current_period_start: snapshot.current_period_start.map(|t| t.as_unix_secs()),
            current_period_end: snapshot.current_period_end.map(|t| t.as_unix_secs()),
            cancel_at_period_end: snapshot.cancel_at_period_end,
            payment_method: snapshot.payment_method.map(Into::into),
        }
    }
}

impl From<GetSubscriptionResult> for SubscriptionResponse {
    fn from(result: GetSubscriptionResult) -> Self {
        result.snapshot.map(Into::into).unwrap_or_else(Self::none)
    }
}
