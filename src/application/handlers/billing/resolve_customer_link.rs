//! ResolveCustomerLinkHandler - Find or provision the billing customer for an account.

use std::sync::Arc;

use crate::domain::billing::{BillingError, CustomerLink};
use crate::domain::foundation::{AuthenticatedUser, CustomerId};
use crate::ports::{CreateCustomerRequest, CustomerLinkRepository, PaymentProvider};

/// Returns the account's CustomerLink, creating the provider customer and the
/// link on first use.
///
/// Sequential calls are idempotent: once a link exists no further provider
/// calls are made. Two concurrent first calls are settled by the store's
/// uniqueness constraints; the loser fails with `CustomerProvisioningFailed`
/// and its provider customer is left orphaned.
pub struct ResolveCustomerLinkHandler {
    links: Arc<dyn CustomerLinkRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl ResolveCustomerLinkHandler {
    pub fn new(
        links: Arc<dyn CustomerLinkRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            links,
            payment_provider,
        }
    }

    pub async fn handle(&self, user: &AuthenticatedUser) -> Result<CustomerLink, BillingError> {
        // 1. Existing link wins
        let existing = self.links.find_by_user_id(&user.id).await.map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Customer link lookup failed");
            BillingError::provisioning_failed(e.to_string())
        })?;
        if let Some(link) = existing {
            return Ok(link);
        }

        // 2. Provision the provider customer
        let customer = self
            .payment_provider
            .create_customer(CreateCustomerRequest {
                user_id: user.id.clone(),
                email: user.email.clone(),
                idempotency_key: Some(format!("customer-{}", user.id)),
            })
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Customer creation failed");
                BillingError::provisioning_failed(e.message)
            })?;

        let customer_id = CustomerId::new(customer.id)
            .map_err(|e| BillingError::provisioning_failed(e.to_string()))?;

        // 3. Persist the link
        let link = CustomerLink::new(user.id.clone(), customer_id);
        if let Err(e) = self.links.insert(&link).await {
            tracing::warn!(
                user_id = %user.id,
                customer_id = %link.customer_id(),
                conflict = e.is_conflict(),
                error = %e,
                "Customer link not stored; provider customer orphaned"
            );
            return Err(BillingError::provisioning_failed(e.to_string()));
        }

        tracing::info!(
            user_id = %user.id,
            customer_id = %link.customer_id(),
            "Customer link created"
        );
        Ok(link)
    }
}
