//! Billing-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | Checkout | Webhook |
//! |-------|----------|---------|
//! | CustomerProvisioningFailed | 500 | - |
//! | CheckoutFailed | 400 | - |
//! | Provider | 502 | 400 |
//! | CustomerMismatch | 502 | 400 |
//! | Storage | 500 | 400 |

use thiserror::Error;

use crate::domain::foundation::{CustomerId, DomainError};

#[derive(Debug, Clone, Error)]
pub enum BillingError {
    /// The account could not be linked to a provider customer.
    #[error("Failed to create customer: {0}")]
    CustomerProvisioningFailed(String),

    /// Checkout session creation was rejected; carries the provider's message.
    #[error("{0}")]
    CheckoutFailed(String),

    /// Provider call failed while fetching subscription state.
    #[error("Billing provider error: {0}")]
    Provider(String),

    /// Provider returned data belonging to a different customer.
    #[error("Provider returned subscription for {actual}, expected {expected}")]
    CustomerMismatch {
        expected: CustomerId,
        actual: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl BillingError {
    pub fn provisioning_failed(reason: impl Into<String>) -> Self {
        BillingError::CustomerProvisioningFailed(reason.into())
    }

    pub fn checkout_failed(message: impl Into<String>) -> Self {
        BillingError::CheckoutFailed(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        BillingError::Provider(message.into())
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        BillingError::Storage(err.to_string())
    }
}
