//! Billing domain module.
//!
//! Local mirror of billing-provider state: the account-to-customer link, the
//! subscription snapshot, and the verified event view that drives resyncs.
//!
//! # Module Structure
//!
//! - `customer_link` - Account ↔ provider customer mapping
//! - `subscription` - Full-replacement subscription snapshot
//! - `event` - Narrow event view and the tracked-event allow-list
//! - `webhook_verifier` - HMAC-SHA256 signature verification
//! - `webhook_errors` - Intake rejection reasons
//! - `errors` - Billing operation failures

mod customer_link;
mod errors;
mod event;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

pub use customer_link::CustomerLink;
pub use errors::BillingError;
pub use event::{is_tracked, BillingEvent, BillingEventData, TRACKED_EVENTS};
pub use subscription::{CardSummary, SubscriptionSnapshot, SubscriptionStatus};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};
