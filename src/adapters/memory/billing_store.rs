//! In-memory billing store.
//!
//! Implements both `CustomerLinkRepository` and `SubscriptionRepository` over
//! one shared state so the relational rules of the PostgreSQL schema hold:
//! links are unique in both directions and a snapshot needs a link.
//!
//! # Example
//!
//! ```ignore
//! let store = InMemoryBillingStore::new();
//! let links: Arc<dyn CustomerLinkRepository> = Arc::new(store.clone());
//! let snapshots: Arc<dyn SubscriptionRepository> = Arc::new(store.clone());
//!
//! // ... exercise handlers ...
//! assert_eq!(store.snapshot_write_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::billing::{CustomerLink, SubscriptionSnapshot};
use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, UserId};
use crate::ports::{CustomerLinkRepository, SubscriptionRepository};

#[derive(Debug, Default)]
struct StoreState {
    links: HashMap<UserId, CustomerLink>,
    snapshots: HashMap<CustomerId, SubscriptionSnapshot>,
    link_writes: usize,
    snapshot_writes: usize,
}

/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // === Test Helpers ===

    /// Seeds a link directly, bypassing uniqueness checks.
    pub fn seed_link(&self, link: CustomerLink) {
        self.write().links.insert(link.user_id().clone(), link);
    }

    /// Number of successful link inserts.
    pub fn link_write_count(&self) -> usize {
        self.read().link_writes
    }

    /// Number of successful snapshot upserts.
    pub fn snapshot_write_count(&self) -> usize {
        self.read().snapshot_writes
    }

    /// Total successful writes across both tables.
    pub fn write_count(&self) -> usize {
        let state = self.read();
        state.link_writes + state.snapshot_writes
    }

    pub fn link_count(&self) -> usize {
        self.read().links.len()
    }

    pub fn snapshot(&self, customer_id: &CustomerId) -> Option<SubscriptionSnapshot> {
        self.read().snapshots.get(customer_id).cloned()
    }
}

#[async_trait]
impl CustomerLinkRepository for InMemoryBillingStore {
    async fn insert(&self, link: &CustomerLink) -> Result<(), DomainError> {
        let mut state = self.write();

        let customer_taken = state
            .links
            .values()
            .any(|l| l.customer_id() == link.customer_id());
        if state.links.contains_key(link.user_id()) || customer_taken {
            return Err(
                DomainError::new(ErrorCode::Conflict, "Customer link already exists")
                    .with_detail("user_id", link.user_id().as_str()),
            );
        }

        state.links.insert(link.user_id().clone(), link.clone());
        state.link_writes += 1;
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<CustomerLink>, DomainError> {
        Ok(self.read().links.get(user_id).cloned())
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerLink>, DomainError> {
        Ok(self
            .read()
            .links
            .values()
            .find(|l| l.customer_id() == customer_id)
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryBillingStore {
    async fn upsert(&self, snapshot: &SubscriptionSnapshot) -> Result<(), DomainError> {
        let mut state = self.write();

        let linked = state
            .links
            .values()
            .any(|l| l.customer_id() == &snapshot.customer_id);
        if !linked {
            return Err(DomainError::new(
                ErrorCode::CustomerLinkNotFound,
                "Snapshot references an unlinked customer",
            )
            .with_detail("customer_id", snapshot.customer_id.as_str()));
        }

        state
            .snapshots
            .insert(snapshot.customer_id.clone(), snapshot.clone());
        state.snapshot_writes += 1;
        Ok(())
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError> {
        Ok(self.read().snapshots.get(customer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::SubscriptionStatus;

    fn link(user: &str, customer: &str) -> CustomerLink {
        CustomerLink::new(UserId::new(user).unwrap(), CustomerId::new(customer).unwrap())
    }

    fn active(customer: &str) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            subscription_id: Some("sub_1".to_string()),
            status: SubscriptionStatus::from_provider("active"),
            ..SubscriptionSnapshot::none(CustomerId::new(customer).unwrap())
        }
    }

    #[tokio::test]
    async fn insert_then_find_both_ways() {
        let store = InMemoryBillingStore::new();
        store.insert(&link("user-1", "cus_1")).await.unwrap();

        let by_user = store
            .find_by_user_id(&UserId::new("user-1").unwrap())
            .await
            .unwrap();
        let by_customer = CustomerLinkRepository::find_by_customer_id(
            &store,
            &CustomerId::new("cus_1").unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(by_user, by_customer);
        assert_eq!(store.link_write_count(), 1);
    }

    #[tokio::test]
    async fn second_link_for_same_user_conflicts() {
        let store = InMemoryBillingStore::new();
        store.insert(&link("user-1", "cus_1")).await.unwrap();

        let err = store.insert(&link("user-1", "cus_2")).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.link_count(), 1);
    }

    #[tokio::test]
    async fn second_link_for_same_customer_conflicts() {
        let store = InMemoryBillingStore::new();
        store.insert(&link("user-1", "cus_1")).await.unwrap();

        let err = store.insert(&link("user-2", "cus_1")).await.unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn upsert_requires_link() {
        let store = InMemoryBillingStore::new();

        let err = store.upsert(&active("cus_orphan")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::CustomerLinkNotFound);
        assert_eq!(store.snapshot_write_count(), 0);
    }

    #[tokio::test]
    async fn upsert_replaces_whole_row() {
        let store = InMemoryBillingStore::new();
        store.insert(&link("user-1", "cus_1")).await.unwrap();
        let customer = CustomerId::new("cus_1").unwrap();

        store.upsert(&active("cus_1")).await.unwrap();
        store
            .upsert(&SubscriptionSnapshot::none(customer.clone()))
            .await
            .unwrap();

        let stored = store.snapshot(&customer).unwrap();
        assert!(stored.status.is_none());
        assert!(stored.subscription_id.is_none());
        assert_eq!(store.snapshot_write_count(), 2);
    }
}
