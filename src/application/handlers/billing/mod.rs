//! Billing handlers.
//!
//! ## Commands
//! - Resolving (or provisioning) the caller's customer link
//! - Starting a hosted checkout
//! - Syncing after the customer returns from checkout
//! - Processing verified webhook deliveries
//!
//! ## Queries
//! - Reading the caller's stored subscription snapshot
//!
//! `SubscriptionSynchronizer` is shared by the post-checkout and webhook paths;
//! it is the only code that writes snapshots.

mod complete_checkout;
mod get_subscription;
mod handle_webhook;
mod resolve_customer_link;
mod start_checkout;
mod sync_subscription;

// Commands
pub use complete_checkout::CompleteCheckoutHandler;
pub use handle_webhook::{
    HandleWebhookCommand, HandleWebhookHandler, WebhookFailure, WebhookOutcome,
};
pub use resolve_customer_link::ResolveCustomerLinkHandler;
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler};
pub use sync_subscription::{SubscriptionSynchronizer, SyncOutcome};

// Queries
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult};
