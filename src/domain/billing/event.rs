//! Narrow view of a verified provider event.
//!
//! Only the fields the intake pipeline reads are captured: identity, type,
//! mode, and the `customer` reference on the event object. Everything else in
//! the payload is ignored, and absent optional fields become `None` rather
//! than parse failures.

use serde::Deserialize;

use crate::domain::foundation::CustomerId;

/// Event types that trigger a state sync. Anything else is acknowledged and dropped.
pub const TRACKED_EVENTS: [&str; 18] = [
    "checkout.session.completed",
    "customer.subscription.created",
    "customer.subscription.updated",
    "customer.subscription.deleted",
    "customer.subscription.paused",
    "customer.subscription.resumed",
    "customer.subscription.pending_update_applied",
    "customer.subscription.pending_update_expired",
    "customer.subscription.trial_will_end",
    "invoice.paid",
    "invoice.payment_failed",
    "invoice.payment_action_required",
    "invoice.upcoming",
    "invoice.marked_uncollectible",
    "invoice.payment_succeeded",
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "payment_intent.canceled",
];

/// Returns true when `event_type` is on the allow-list.
pub fn is_tracked(event_type: &str) -> bool {
    TRACKED_EVENTS.contains(&event_type)
}

/// Provider event after signature verification.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingEvent {
    /// Event id (`evt_...`). Empty when the payload omits it.
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub data: BillingEventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingEventData {
    /// The object the event is about; shape varies by event type.
    #[serde(default)]
    pub object: serde_json::Value,
}

impl BillingEvent {
    pub fn is_tracked(&self) -> bool {
        is_tracked(&self.event_type)
    }

    /// Kind of the embedded object (`"subscription"`, `"invoice"`, ...).
    pub fn object_kind(&self) -> Option<&str> {
        self.data.object.get("object").and_then(|v| v.as_str())
    }

    /// Customer referenced by the event object.
    ///
    /// `None` when the key is absent, null, expanded into an object, or an
    /// empty string. Only a plain string reference is trusted.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.data
            .object
            .get("customer")
            .and_then(|v| v.as_str())
            .and_then(|s| CustomerId::new(s).ok())
    }
}
