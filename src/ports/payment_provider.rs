//! Payment provider port for the external billing system.
//!
//! Only the three calls the sync layer needs: provision a customer, list a
//! customer's subscriptions, and open a hosted checkout session. The provider
//! is the system of record; nothing here writes subscription state upstream.

use crate::domain::billing::CardSummary;
use crate::domain::foundation::{CustomerId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for billing provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer in the billing system.
    ///
    /// The local account id is attached as metadata so the provider dashboard
    /// can be traced back to the account.
    async fn create_customer(&self, request: CreateCustomerRequest)
        -> Result<Customer, PaymentError>;

    /// List subscriptions matching the query, newest first.
    async fn list_subscriptions(
        &self,
        query: &ListSubscriptionsQuery,
    ) -> Result<Vec<Subscription>, PaymentError>;

    /// Create a hosted checkout session for a subscription purchase.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Internal account id (stored as `metadata[user_id]`).
    pub user_id: UserId,

    pub email: String,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Customer in the billing system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
}

/// Subscription listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSubscriptionsQuery {
    pub customer_id: CustomerId,

    /// Status filter; `"all"` includes canceled and incomplete subscriptions.
    pub status: String,

    pub limit: u32,

    /// Expand `default_payment_method` so card details arrive inline.
    pub expand_payment_method: bool,
}

impl ListSubscriptionsQuery {
    /// The sync query: most recent subscription in any status, card expanded.
    pub fn latest_for(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            status: "all".to_string(),
            limit: 1,
            expand_payment_method: true,
        }
    }
}

/// Subscription as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,

    /// Customer the provider says owns this subscription.
    pub customer_id: String,

    /// Provider status string, uninterpreted.
    pub status: String,

    /// Price of the first subscription item.
    pub price_id: Option<String>,

    /// Current billing period start (Unix timestamp).
    pub current_period_start: Option<i64>,

    /// Current billing period end (Unix timestamp).
    pub current_period_end: Option<i64>,

    pub cancel_at_period_end: bool,

    /// Present only when the default payment method is a card.
    pub card: Option<CardSummary>,
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    pub customer_id: CustomerId,
    pub price_id: String,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID (`cs_...`).
    pub id: String,

    /// Hosted checkout URL.
    pub url: Option<String>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message. For rejected requests this is the provider's own text.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// API key rejected.
    AuthenticationError,

    /// Request rejected by the provider (bad price, bad customer, ...).
    InvalidRequest,

    NotFound,

    RateLimitExceeded,

    /// Provider-side failure or unparseable response.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }

    /// Maps an HTTP status from the provider to an error code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => PaymentErrorCode::AuthenticationError,
            404 => PaymentErrorCode::NotFound,
            429 => PaymentErrorCode::RateLimitExceeded,
            400..=499 => PaymentErrorCode::InvalidRequest,
            _ => PaymentErrorCode::ProviderError,
        }
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
