//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API using
//! form-encoded requests and basic auth with the secret key.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_timeout(Duration::from_secs(10));
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer,
    ListSubscriptionsQuery, PaymentError, PaymentErrorCode, PaymentProvider, Subscription,
};

use super::api_types::{
    StripeCheckoutSession, StripeCustomer, StripeErrorEnvelope, StripeList, StripeSubscription,
};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Upper bound on any single API call.
    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (stripe-mock, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Builds the adapter and its HTTP client.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Reads a successful body or converts a failure into a `PaymentError`.
    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_body(status.as_u16(), &body);
            tracing::error!(
                operation,
                status = status.as_u16(),
                code = %error.code,
                provider_code = ?error.provider_code,
                message = %error.message,
                "Stripe API call failed"
            );
            return Err(error);
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

/// Form fields for `POST /v1/customers`.
fn customer_params(request: &CreateCustomerRequest) -> Vec<(&'static str, String)> {
    vec![
        ("email", request.email.clone()),
        ("metadata[user_id]", request.user_id.to_string()),
    ]
}

/// Query string for `GET /v1/subscriptions`.
fn list_params(query: &ListSubscriptionsQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("customer", query.customer_id.to_string()),
        ("status", query.status.clone()),
        ("limit", query.limit.to_string()),
    ];
    if query.expand_payment_method {
        params.push(("expand[]", "data.default_payment_method".to_string()));
    }
    params
}

/// Form fields for `POST /v1/checkout/sessions`.
fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_string()),
        ("customer", request.customer_id.to_string()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
    ]
}

/// Builds a `PaymentError` from a non-2xx response body.
///
/// Uses Stripe's own `error.message` when the body is a Stripe error envelope
/// so callers can pass it through to the user unchanged.
fn error_from_body(status: u16, body: &str) -> PaymentError {
    let code = PaymentErrorCode::from_status(status);

    match serde_json::from_str::<StripeErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| format!("Stripe API error (HTTP {})", status));
            let error = PaymentError::new(code, message);
            match envelope.error.code.or(envelope.error.error_type) {
                Some(provider_code) => error.with_provider_code(provider_code),
                None => error,
            }
        }
        Err(_) => PaymentError::new(code, format!("Stripe API error (HTTP {}): {}", status, body)),
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let mut builder = self
            .http_client
            .post(self.url("/v1/customers"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&customer_params(&request));

        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let customer: StripeCustomer = Self::read_response(response, "create_customer").await?;

        tracing::info!(
            user_id = %request.user_id,
            customer_id = %customer.id,
            "Stripe customer created"
        );

        Ok(Customer {
            id: customer.id,
            email: customer.email,
        })
    }

    async fn list_subscriptions(
        &self,
        query: &ListSubscriptionsQuery,
    ) -> Result<Vec<Subscription>, PaymentError> {
        let response = self
            .http_client
            .get(self.url("/v1/subscriptions"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&list_params(query))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let list: StripeList<StripeSubscription> =
            Self::read_response(response, "list_subscriptions").await?;

        Ok(list.data.into_iter().map(StripeSubscription::into_port).collect())
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .http_client
            .post(self.url("/v1/checkout/sessions"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&checkout_params(&request))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let session: StripeCheckoutSession =
            Self::read_response(response, "create_checkout_session").await?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}
