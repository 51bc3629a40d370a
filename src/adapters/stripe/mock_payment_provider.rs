//! Mock payment provider for testing.
//!
//! Configurable in-process stand-in for Stripe. Supports:
//! - Pre-configured customers, subscriptions and checkout sessions
//! - Per-method error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer,
    ListSubscriptionsQuery, PaymentError, PaymentProvider, Subscription,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_next_customer_id("cus_123");
/// mock.set_subscriptions("cus_123", vec![active_subscription()]);
/// mock.set_method_error("create_checkout_session", PaymentError::invalid_request("No such price"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Id handed out by the next `create_customer` call.
    next_customer_id: Option<String>,

    /// Subscriptions returned by `list_subscriptions`, keyed by customer id.
    subscriptions: HashMap<String, Vec<Subscription>>,

    /// Session returned by the next `create_checkout_session` call.
    next_checkout: Option<CheckoutSession>,

    /// Specific errors by method name. Sticky until cleared.
    method_errors: HashMap<String, PaymentError>,

    call_log: Vec<MethodCall>,

    sequence: u64,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Id to return from the next `create_customer` call.
    pub fn set_next_customer_id(&self, id: impl Into<String>) {
        self.state().next_customer_id = Some(id.into());
    }

    /// Replace the provider-side subscription list for a customer.
    pub fn set_subscriptions(&self, customer_id: impl Into<String>, subscriptions: Vec<Subscription>) {
        self.state()
            .subscriptions
            .insert(customer_id.into(), subscriptions);
    }

    /// Remove every subscription for a customer.
    pub fn clear_subscriptions(&self, customer_id: &str) {
        self.state().subscriptions.remove(customer_id);
    }

    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.state().next_checkout = Some(session);
    }

    /// Make every call to `method` fail with `error`.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        self.state().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Records the call and returns the injected error for `method`, if any.
    fn record(&self, method: &str, args: Vec<String>) -> Result<(), PaymentError> {
        let mut state = self.state();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.method_errors.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        self.record(
            "create_customer",
            vec![request.user_id.to_string(), request.email.clone()],
        )?;

        let mut state = self.state();
        state.sequence += 1;
        let id = match state.next_customer_id.take() {
            Some(id) => id,
            None => format!("cus_mock_{}", state.sequence),
        };

        Ok(Customer {
            id,
            email: Some(request.email),
        })
    }

    async fn list_subscriptions(
        &self,
        query: &ListSubscriptionsQuery,
    ) -> Result<Vec<Subscription>, PaymentError> {
        self.record("list_subscriptions", vec![query.customer_id.to_string()])?;

        let state = self.state();
        let subscriptions = state
            .subscriptions
            .get(query.customer_id.as_str())
            .cloned()
            .unwrap_or_default();

        Ok(subscriptions.into_iter().take(query.limit as usize).collect())
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record(
            "create_checkout_session",
            vec![request.customer_id.to_string(), request.price_id.clone()],
        )?;

        let mut state = self.state();
        state.sequence += 1;
        let sequence = state.sequence;
        Ok(state.next_checkout.take().unwrap_or_else(|| CheckoutSession {
            id: format!("cs_mock_{}", sequence),
            url: Some(format!("https://checkout.stripe.test/c/cs_mock_{}", sequence)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CustomerId, UserId};

    fn customer_request() -> CreateCustomerRequest {
        CreateCustomerRequest {
            user_id: UserId::new("user-1").unwrap(),
            email: "a@example.com".to_string(),
            idempotency_key: None,
        }
    }

    fn subscription(id: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            customer_id: "cus_123".to_string(),
            status: "active".to_string(),
            price_id: Some("price_1".to_string()),
            current_period_start: Some(1_697_000_000),
            current_period_end: Some(1_700_000_000),
            cancel_at_period_end: false,
            card: None,
        }
    }

    #[tokio::test]
    async fn create_customer_uses_configured_id_once() {
        let mock = MockPaymentProvider::new();
        mock.set_next_customer_id("cus_123");

        let first = mock.create_customer(customer_request()).await.unwrap();
        let second = mock.create_customer(customer_request()).await.unwrap();

        assert_eq!(first.id, "cus_123");
        assert_ne!(second.id, "cus_123");
        assert_eq!(mock.call_count("create_customer"), 2);
    }

    #[tokio::test]
    async fn list_subscriptions_honours_limit() {
        let mock = MockPaymentProvider::new();
        mock.set_subscriptions("cus_123", vec![subscription("sub_2"), subscription("sub_1")]);

        let query = ListSubscriptionsQuery::latest_for(CustomerId::new("cus_123").unwrap());
        let subs = mock.list_subscriptions(&query).await.unwrap();

        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, "sub_2");
    }

    #[tokio::test]
    async fn list_subscriptions_for_unknown_customer_is_empty() {
        let mock = MockPaymentProvider::new();
        let query = ListSubscriptionsQuery::latest_for(CustomerId::new("cus_x").unwrap());

        assert!(mock.list_subscriptions(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn method_error_is_returned_and_call_recorded() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error("create_customer", PaymentError::network("timeout"));

        let result = mock.create_customer(customer_request()).await;

        assert!(result.is_err());
        assert!(mock.was_called("create_customer"));

        mock.clear_errors();
        assert!(mock.create_customer(customer_request()).await.is_ok());
    }

    #[tokio::test]
    async fn checkout_session_defaults_are_generated() {
        let mock = MockPaymentProvider::new();
        let session = mock
            .create_checkout_session(CreateCheckoutRequest {
                customer_id: CustomerId::new("cus_123").unwrap(),
                price_id: "price_1".to_string(),
                success_url: "s".to_string(),
                cancel_url: "c".to_string(),
            })
            .await
            .unwrap();

        assert!(session.id.starts_with("cs_mock_"));
        assert_eq!(
            mock.calls()[0].args,
            vec!["cus_123".to_string(), "price_1".to_string()]
        );
    }
}
