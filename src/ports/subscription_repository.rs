//! Subscription snapshot repository port.
//!
//! There is exactly one write operation, `upsert`, and it replaces the whole
//! record. Callers never patch individual columns.

use crate::domain::billing::SubscriptionSnapshot;
use crate::domain::foundation::{CustomerId, DomainError};
use async_trait::async_trait;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert or fully replace the snapshot keyed by its customer id.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (including a missing owning link)
    async fn upsert(&self, snapshot: &SubscriptionSnapshot) -> Result<(), DomainError>;

    /// Current snapshot for a customer, if one has ever been synced.
    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }
}
