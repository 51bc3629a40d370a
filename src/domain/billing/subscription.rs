//! Local mirror of a customer's subscription.
//!
//! A `SubscriptionSnapshot` is never edited field by field. Every sync builds a
//! complete new value and the store replaces the previous one wholesale, so the
//! mirror can never drift into a mix of old and new provider state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CustomerId, Timestamp};

/// Subscription status as reported by the provider.
///
/// Provider strings pass through verbatim. `"none"` is the local sentinel for a
/// customer with no subscription at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionStatus(String);

impl SubscriptionStatus {
    pub const NONE: &'static str = "none";

    /// The "no subscription" sentinel.
    pub fn none() -> Self {
        Self(Self::NONE.to_string())
    }

    /// Wraps a provider status string without interpretation.
    pub fn from_provider(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == Self::NONE
    }

    /// Statuses under which the provider still considers the customer paid up.
    pub fn grants_access(&self) -> bool {
        matches!(self.0.as_str(), "active" | "trialing" | "past_due")
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display-safe summary of the default payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub brand: String,
    pub last4: String,
}

/// Full replacement record of a customer's subscription state.
///
/// Carries provider state only, so two syncs of unchanged provider state
/// produce identical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub customer_id: CustomerId,
    pub subscription_id: Option<String>,
    pub status: SubscriptionStatus,
    pub price_id: Option<String>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub payment_method: Option<CardSummary>,
}

impl SubscriptionSnapshot {
    /// Snapshot for a customer with no subscription: every field cleared.
    pub fn none(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            subscription_id: None,
            status: SubscriptionStatus::none(),
            price_id: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            payment_method: None,
        }
    }

    pub fn has_subscription(&self) -> bool {
        !self.status.is_none()
    }
}
