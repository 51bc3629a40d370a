//! SubscriptionSynchronizer - Fetch-and-overwrite of a customer's subscription snapshot.
//!
//! The synchronizer never applies event payloads. It asks the provider for the
//! customer's latest subscription and replaces the stored snapshot with what
//! comes back, so any number of events about a customer collapse into the same
//! final state.

use std::sync::Arc;

use crate::domain::billing::{BillingError, SubscriptionSnapshot, SubscriptionStatus};
use crate::domain::foundation::{CustomerId, Timestamp};
use crate::ports::{
    CustomerLinkRepository, ListSubscriptionsQuery, PaymentProvider, Subscription,
    SubscriptionRepository,
};

/// Result of a sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The snapshot was replaced with this value.
    Synced(SubscriptionSnapshot),

    /// No local link for the customer; nothing fetched, nothing written.
    UnknownCustomer,
}

impl SyncOutcome {
    pub fn snapshot(&self) -> Option<&SubscriptionSnapshot> {
        match self {
            SyncOutcome::Synced(snapshot) => Some(snapshot),
            SyncOutcome::UnknownCustomer => None,
        }
    }
}

pub struct SubscriptionSynchronizer {
    links: Arc<dyn CustomerLinkRepository>,
    snapshots: Arc<dyn SubscriptionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl SubscriptionSynchronizer {
    pub fn new(
        links: Arc<dyn CustomerLinkRepository>,
        snapshots: Arc<dyn SubscriptionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            links,
            snapshots,
            payment_provider,
        }
    }

    pub async fn sync(&self, customer_id: &CustomerId) -> Result<SyncOutcome, BillingError> {
        if self.links.find_by_customer_id(customer_id).await?.is_none() {
            tracing::info!(customer_id = %customer_id, "Sync skipped for unknown customer");
            return Ok(SyncOutcome::UnknownCustomer);
        }

        let subscriptions = self
            .payment_provider
            .list_subscriptions(&ListSubscriptionsQuery::latest_for(customer_id.clone()))
            .await
            .map_err(|e| {
                tracing::error!(customer_id = %customer_id, error = %e, "Subscription fetch failed");
                BillingError::provider(e.message)
            })?;

        let snapshot = match subscriptions.first() {
            None => SubscriptionSnapshot::none(customer_id.clone()),
            Some(subscription) => {
                if subscription.customer_id != customer_id.as_str() {
                    tracing::error!(
                        customer_id = %customer_id,
                        returned_customer = %subscription.customer_id,
                        subscription_id = %subscription.id,
                        "Provider returned a subscription for another customer"
                    );
                    return Err(BillingError::CustomerMismatch {
                        expected: customer_id.clone(),
                        actual: subscription.customer_id.clone(),
                    });
                }
                snapshot_from(customer_id.clone(), subscription)
            }
        };

        self.snapshots.upsert(&snapshot).await?;

        tracing::info!(
            customer_id = %customer_id,
            status = %snapshot.status,
            "Subscription snapshot replaced"
        );
        Ok(SyncOutcome::Synced(snapshot))
    }
}

/// Builds a complete snapshot from the provider's view of a subscription.
fn snapshot_from(customer_id: CustomerId, subscription: &Subscription) -> SubscriptionSnapshot {
    SubscriptionSnapshot {
        customer_id,
        subscription_id: Some(subscription.id.clone()),
        status: SubscriptionStatus::from_provider(subscription.status.clone()),
        price_id: subscription.price_id.clone(),
        current_period_start: subscription
            .current_period_start
            .and_then(Timestamp::from_unix_secs),
        current_period_end: subscription
            .current_period_end
            .and_then(Timestamp::from_unix_secs),
        cancel_at_period_end: subscription.cancel_at_period_end,
        payment_method: subscription.card.clone(),
    }
}
