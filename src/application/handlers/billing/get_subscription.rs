//! GetSubscriptionHandler - Query handler for the caller's stored snapshot.
//!
//! Reads local state only. The provider is never consulted.

use std::sync::Arc;

use crate::domain::billing::{BillingError, SubscriptionSnapshot};
use crate::domain::foundation::{CustomerId, UserId};
use crate::ports::{CustomerLinkRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSubscriptionResult {
    /// Linked provider customer, if the account has checked out before.
    pub customer_id: Option<CustomerId>,

    /// Last synced snapshot, if any sync has completed.
    pub snapshot: Option<SubscriptionSnapshot>,
}

pub struct GetSubscriptionHandler {
    links: Arc<dyn CustomerLinkRepository>,
    snapshots: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(
        links: Arc<dyn CustomerLinkRepository>,
        snapshots: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self { links, snapshots }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<GetSubscriptionResult, BillingError> {
        let Some(link) = self.links.find_by_user_id(&query.user_id).await? else {
            return Ok(GetSubscriptionResult {
                customer_id: None,
                snapshot: None,
            });
        };

        let snapshot = self.snapshots.find_by_customer_id(link.customer_id()).await?;

        Ok(GetSubscriptionResult {
            customer_id: Some(link.customer_id().clone()),
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBillingStore;
    use crate::domain::billing::{CustomerLink, SubscriptionStatus};

    fn setup() -> (GetSubscriptionHandler, InMemoryBillingStore) {
        let store = InMemoryBillingStore::new();
        let handler = GetSubscriptionHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (handler, store)
    }

    fn query() -> GetSubscriptionQuery {
        GetSubscriptionQuery {
            user_id: UserId::new("user-1").unwrap(),
        }
    }

    #[tokio::test]
    async fn unlinked_account_has_nothing() {
        let (handler, _store) = setup();

        let result = handler.handle(query()).await.unwrap();

        assert!(result.customer_id.is_none());
        assert!(result.snapshot.is_none());
    }

    #[tokio::test]
    async fn linked_account_without_sync_has_customer_only() {
        let (handler, store) = setup();
        store.seed_link(CustomerLink::new(
            UserId::new("user-1").unwrap(),
            CustomerId::new("cus_1").unwrap(),
        ));

        let result = handler.handle(query()).await.unwrap();

        assert_eq!(result.customer_id.unwrap().as_str(), "cus_1");
        assert!(result.snapshot.is_none());
    }

    #[tokio::test]
    async fn returns_stored_snapshot() {
        let (handler, store) = setup();
        let customer = CustomerId::new("cus_1").unwrap();
        store.seed_link(CustomerLink::new(UserId::new("user-1").unwrap(), customer.clone()));
        store
            .upsert(&SubscriptionSnapshot {
                status: SubscriptionStatus::from_provider("past_due"),
                ..SubscriptionSnapshot::none(customer)
            })
            .await
            .unwrap();

        let result = handler.handle(query()).await.unwrap();

        assert_eq!(result.snapshot.unwrap().status.as_str(), "past_due");
    }
}
