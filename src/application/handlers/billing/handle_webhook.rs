//! HandleWebhookHandler - Verified event intake that triggers a resync.
//!
//! The event is a notification only. Its payload decides *whether* to sync and
//! *which* customer; the synchronizer then fetches the truth from the provider.
//!
//! ```text
//! received ──verify──▶ verified ──allow-list──▶ filtered ──customer──▶ synced ──▶ acknowledged
//!     └──────────────────────── any failure ──▶ rejected (400)
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::domain::billing::{BillingError, StripeWebhookVerifier, WebhookError};
use crate::domain::foundation::CustomerId;

use super::{SubscriptionSynchronizer, SyncOutcome};

/// Raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    /// Request body exactly as received.
    pub payload: Vec<u8>,

    /// `Stripe-Signature` header value, if present.
    pub signature: Option<String>,
}

/// How an accepted event was disposed of. Every variant is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event type is not on the allow-list.
    Ignored { event_type: String },

    /// Tracked event whose object has no usable `customer` reference.
    MissingCustomer { event_type: String },

    /// Tracked event for a customer we have no link for.
    UnknownCustomer { customer_id: CustomerId },

    /// Snapshot replaced.
    Synced { customer_id: CustomerId },
}

/// Reasons the delivery is answered with 400 so the provider retries.
#[derive(Debug, Error)]
pub enum WebhookFailure {
    #[error(transparent)]
    Rejected(#[from] WebhookError),

    #[error("Sync failed: {0}")]
    SyncFailed(#[from] BillingError),
}

pub struct HandleWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    synchronizer: Arc<SubscriptionSynchronizer>,
    require_livemode: bool,
}

impl HandleWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        synchronizer: Arc<SubscriptionSynchronizer>,
    ) -> Self {
        Self {
            verifier,
            synchronizer,
            require_livemode: false,
        }
    }

    /// Reject test-mode events.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub async fn handle(&self, cmd: HandleWebhookCommand) -> Result<WebhookOutcome, WebhookFailure> {
        // 1. Verify before reading anything from the payload
        let event = cmd
            .signature
            .ok_or(WebhookError::MissingSignature)
            .and_then(|signature| self.verifier.verify_and_parse(&cmd.payload, &signature))
            .map_err(|e| {
                tracing::warn!(
                    security_event = e.is_security_event(),
                    error = %e,
                    "Webhook rejected"
                );
                e
            })?;

        if self.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Test-mode webhook rejected");
            return Err(WebhookError::LivemodeMismatch.into());
        }

        // 2. Allow-list
        if !event.is_tracked() {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Untracked event");
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        }

        // 3. Customer reference
        let Some(customer_id) = event.customer_id() else {
            tracing::info!(
                event_id = %event.id,
                event_type = %event.event_type,
                object = event.object_kind().unwrap_or("unknown"),
                "Tracked event without customer reference"
            );
            return Ok(WebhookOutcome::MissingCustomer {
                event_type: event.event_type,
            });
        };

        // 4. Resync
        let outcome = self.synchronizer.sync(&customer_id).await.map_err(|e| {
            tracing::error!(
                event_id = %event.id,
                customer_id = %customer_id,
                error = %e,
                "Webhook sync failed"
            );
            e
        })?;

        Ok(match outcome {
            SyncOutcome::Synced(_) => WebhookOutcome::Synced { customer_id },
            SyncOutcome::UnknownCustomer => WebhookOutcome::UnknownCustomer { customer_id },
        })
    }
}
