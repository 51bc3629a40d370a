//! PostgreSQL adapters - Database implementations for the billing stores.
//!
//! - `PostgresCustomerLinkRepository` - user to Stripe customer links
//! - `PostgresSubscriptionRepository` - latest subscription snapshot per customer

mod customer_link_repository;
mod subscription_repository;

pub use customer_link_repository::PostgresCustomerLinkRepository;
pub use subscription_repository::PostgresSubscriptionRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Opens the connection pool described by `config`.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
