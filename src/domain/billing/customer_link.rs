//! Durable association between a local account and a billing customer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, Timestamp, UserId};

/// One-to-one mapping from account to billing provider customer.
///
/// Links are created once and never mutated. Uniqueness in both directions is
/// enforced by the store, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLink {
    user_id: UserId,
    customer_id: CustomerId,
    created_at: Timestamp,
}

impl CustomerLink {
    /// Creates a link stamped with the current time.
    pub fn new(user_id: UserId, customer_id: CustomerId) -> Self {
        Self::reconstitute(user_id, customer_id, Timestamp::now())
    }

    /// Rebuilds a link loaded from storage.
    pub fn reconstitute(user_id: UserId, customer_id: CustomerId, created_at: Timestamp) -> Self {
        Self {
            user_id,
            customer_id,
            created_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
