//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::billing::{
    CompleteCheckoutHandler, GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult,
    HandleWebhookCommand, HandleWebhookHandler, ResolveCustomerLinkHandler, StartCheckoutCommand,
    StartCheckoutHandler, SubscriptionSynchronizer, SyncOutcome, WebhookFailure, WebhookOutcome,
};
