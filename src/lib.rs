//! Billing Sync - local subscription state kept in lockstep with Stripe
//!
//! Every change notification (a webhook delivery or a customer returning from
//! checkout) triggers a fresh fetch of the customer's latest subscription, and
//! the stored snapshot is replaced wholesale. Event payloads are never applied
//! as deltas.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
