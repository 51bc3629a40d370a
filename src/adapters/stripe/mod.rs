//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API:
//! - Customer provisioning
//! - Subscription listing (latest, any status, card expanded)
//! - Hosted checkout sessions
//!
//! Webhook signature verification lives in `domain::billing` because it runs
//! on the raw request body before any provider call.

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{StripeCheckoutSession, StripeCustomer, StripeList, StripeSubscription};
pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
