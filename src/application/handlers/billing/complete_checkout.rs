//! CompleteCheckoutHandler - Eager sync when the customer returns from checkout.
//!
//! Webhooks will reconcile the snapshot eventually; this closes the gap so the
//! returning user sees their new subscription straight away.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::domain::foundation::AuthenticatedUser;

use super::{ResolveCustomerLinkHandler, SubscriptionSynchronizer, SyncOutcome};

pub struct CompleteCheckoutHandler {
    resolver: Arc<ResolveCustomerLinkHandler>,
    synchronizer: Arc<SubscriptionSynchronizer>,
}

impl CompleteCheckoutHandler {
    pub fn new(
        resolver: Arc<ResolveCustomerLinkHandler>,
        synchronizer: Arc<SubscriptionSynchronizer>,
    ) -> Self {
        Self {
            resolver,
            synchronizer,
        }
    }

    pub async fn handle(&self, user: &AuthenticatedUser) -> Result<SyncOutcome, BillingError> {
        let link = self.resolver.handle(user).await?;
        self.synchronizer.sync(link.customer_id()).await
    }
}
