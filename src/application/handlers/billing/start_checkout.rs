//! StartCheckoutHandler - Command handler for opening a hosted checkout session.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::{CheckoutSession, CreateCheckoutRequest, PaymentProvider};

use super::ResolveCustomerLinkHandler;

/// Command to start a subscription checkout for the caller.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub user: AuthenticatedUser,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

pub struct StartCheckoutHandler {
    resolver: Arc<ResolveCustomerLinkHandler>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl StartCheckoutHandler {
    pub fn new(
        resolver: Arc<ResolveCustomerLinkHandler>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            resolver,
            payment_provider,
        }
    }

    /// Links the caller to a provider customer, then opens a checkout session
    /// for that customer.
    ///
    /// Link failures come back as `CustomerProvisioningFailed`; session
    /// failures as `CheckoutFailed` carrying the provider's message.
    pub async fn handle(&self, cmd: StartCheckoutCommand) -> Result<CheckoutSession, BillingError> {
        let link = self.resolver.handle(&cmd.user).await?;

        let session = self
            .payment_provider
            .create_checkout_session(CreateCheckoutRequest {
                customer_id: link.customer_id().clone(),
                price_id: cmd.price_id,
                success_url: cmd.success_url,
                cancel_url: cmd.cancel_url,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    customer_id = %link.customer_id(),
                    error = %e,
                    "Checkout session creation failed"
                );
                BillingError::checkout_failed(e.message)
            })?;

        tracing::info!(
            user_id = %cmd.user.id,
            customer_id = %link.customer_id(),
            session_id = %session.id,
            "Checkout session created"
        );
        Ok(session)
    }
}
