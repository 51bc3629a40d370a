//! Stripe API objects as returned by the REST endpoints we call.
//!
//! Only the fields the adapter reads are declared; serde ignores the rest.
//! Fields Stripe has moved between API versions are optional.

use serde::Deserialize;

use crate::domain::billing::CardSummary;
use crate::ports::Subscription;

// ════════════════════════════════════════════════════════════════════════════════
// Envelopes
// ════════════════════════════════════════════════════════════════════════════════

/// Paginated list wrapper (`{"object":"list","data":[...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// A field that is an id string unless it was requested with `expand[]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Object(obj) => Some(obj),
            Expandable::Id(_) => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Objects
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    pub email: Option<String>,
}

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted checkout URL; absent once the session is complete or expired.
    #[serde(default)]
    pub url: Option<String>,
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Customer ID owning this subscription.
    pub customer: String,

    pub status: String,

    /// Period bounds at subscription level (older API versions).
    #[serde(default)]
    pub current_period_start: Option<i64>,

    #[serde(default)]
    pub current_period_end: Option<i64>,

    #[serde(default)]
    pub cancel_at_period_end: bool,

    #[serde(default)]
    pub default_payment_method: Option<Expandable<StripePaymentMethod>>,

    #[serde(default)]
    pub items: StripeSubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeSubscriptionItems {
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,

    /// Period bounds at item level (newer API versions).
    #[serde(default)]
    pub current_period_start: Option<i64>,

    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

/// Stripe PaymentMethod object (only card details are read).
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentMethod {
    #[serde(rename = "type")]
    pub method_type: String,

    #[serde(default)]
    pub card: Option<StripeCard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCard {
    pub brand: String,
    pub last4: String,
}

impl StripeSubscription {
    fn first_item(&self) -> Option<&StripeSubscriptionItem> {
        self.items.data.first()
    }

    /// Card brand and last4 when the default payment method is a card.
    pub fn card_summary(&self) -> Option<CardSummary> {
        let method = self.default_payment_method.as_ref()?.as_object()?;
        if method.method_type != "card" {
            return None;
        }
        method.card.as_ref().map(|card| CardSummary {
            brand: card.brand.clone(),
            last4: card.last4.clone(),
        })
    }

    /// Converts to the port type, falling back to the first item's period.
    pub fn into_port(self) -> Subscription {
        let item = self.first_item();
        let price_id = item.map(|i| i.price.id.clone());
        let current_period_start = self
            .current_period_start
            .or_else(|| item.and_then(|i| i.current_period_start));
        let current_period_end = self
            .current_period_end
            .or_else(|| item.and_then(|i| i.current_period_end));
        let card = self.card_summary();

        Subscription {
            id: self.id,
            customer_id: self.customer,
            status: self.status,
            price_id,
            current_period_start,
            current_period_end,
            cancel_at_period_end: self.cancel_at_period_end,
            card,
        }
    }
}
