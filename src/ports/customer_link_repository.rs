//! Customer link repository port.
//!
//! Persists the one-to-one mapping between local accounts and billing provider
//! customers.
//!
//! # Design
//!
//! - **Insert-only**: links are never updated
//! - **Unique both ways**: one link per account, one account per customer id
//! - **Owned by the account**: removal happens outside this crate when the
//!   account is deleted; the schema cascades it to the subscription snapshot

use crate::domain::billing::CustomerLink;
use crate::domain::foundation::{CustomerId, DomainError, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait CustomerLinkRepository: Send + Sync {
    /// Insert a new link.
    ///
    /// # Errors
    ///
    /// - `Conflict` if either the account or the customer id is already linked
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, link: &CustomerLink) -> Result<(), DomainError>;

    /// Find the link for a local account.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<CustomerLink>, DomainError>;

    /// Find the link for a provider customer id.
    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerLink>, DomainError>;
}
