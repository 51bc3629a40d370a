//! HTTP adapter for billing endpoints.
//!
//! - `POST /api/billing/checkout-session` - Start a subscription checkout
//! - `GET /api/billing/success` - Post-checkout landing; syncs then redirects
//! - `GET /api/billing/subscription` - Current subscription snapshot
//! - `POST /api/webhooks/stripe` - Signed provider events
//! - `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{BillingApiError, BillingAppState, CheckoutSettings, STRIPE_SIGNATURE_HEADER};
pub use routes::{app_router, billing_routes, webhook_routes};
