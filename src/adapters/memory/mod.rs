//! In-memory adapters for tests and local development without PostgreSQL.

mod billing_store;

pub use billing_store::InMemoryBillingStore;
