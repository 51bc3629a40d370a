//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Billing provider API (customers, subscriptions, checkout)
//! - `CustomerLinkRepository` - Account ↔ customer link persistence
//! - `SubscriptionRepository` - Subscription snapshot persistence
//! - `SessionValidator` - Bearer token validation

mod customer_link_repository;
mod payment_provider;
mod session_validator;
mod subscription_repository;

pub use customer_link_repository::CustomerLinkRepository;
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer,
    ListSubscriptionsQuery, PaymentError, PaymentErrorCode, PaymentProvider, Subscription,
};
pub use session_validator::SessionValidator;
pub use subscription_repository::SubscriptionRepository;
