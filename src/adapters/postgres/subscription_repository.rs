//! PostgreSQL implementation of SubscriptionRepository.
//!
//! The upsert is a single `INSERT ... ON CONFLICT DO UPDATE` that rewrites
//! every column, so concurrent syncs resolve to whichever statement commits last
//! and never leave a row with columns from two different syncs.
//!
//! `synced_at` is stamped by the database on each write and is not part of the
//! snapshot value.

use crate::domain::billing::{CardSummary, SubscriptionSnapshot, SubscriptionStatus};
use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, Timestamp};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    stripe_customer_id: String,
    subscription_id: Option<String>,
    status: String,
    price_id: Option<String>,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    payment_method_brand: Option<String>,
    payment_method_last4: Option<String>,
}

/// Pairs the two card columns. They are written together, so a row with only
/// one of them set is corrupt.
fn card_from_columns(
    brand: Option<String>,
    last4: Option<String>,
) -> Result<Option<CardSummary>, DomainError> {
    match (brand, last4) {
        (Some(brand), Some(last4)) => Ok(Some(CardSummary { brand, last4 })),
        (None, None) => Ok(None),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            "Payment method brand and last4 must be set together",
        )),
    }
}

impl TryFrom<SubscriptionRow> for SubscriptionSnapshot {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let customer_id = CustomerId::new(row.stripe_customer_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid customer_id: {}", e))
        })?;

        let payment_method = card_from_columns(row.payment_method_brand, row.payment_method_last4)
            .map_err(|e| e.with_detail("customer_id", customer_id.as_str()))?;

        Ok(SubscriptionSnapshot {
            customer_id,
            subscription_id: row.subscription_id,
            status: SubscriptionStatus::from_provider(row.status),
            price_id: row.price_id,
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            cancel_at_period_end: row.cancel_at_period_end,
            payment_method,
        })
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn upsert(&self, snapshot: &SubscriptionSnapshot) -> Result<(), DomainError> {
        let card = snapshot.payment_method.as_ref();

        sqlx::query(
            r#"
            INSERT INTO billing_subscriptions (
                stripe_customer_id, subscription_id, status, price_id,
                current_period_start, current_period_end, cancel_at_period_end,
                payment_method_brand, payment_method_last4, synced_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (stripe_customer_id) DO UPDATE SET
                subscription_id = EXCLUDED.subscription_id,
                status = EXCLUDED.status,
                price_id = EXCLUDED.price_id,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                payment_method_brand = EXCLUDED.payment_method_brand,
                payment_method_last4 = EXCLUDED.payment_method_last4,
                synced_at = NOW()
            "#,
        )
        .bind(snapshot.customer_id.as_str())
        .bind(&snapshot.subscription_id)
        .bind(snapshot.status.as_str())
        .bind(&snapshot.price_id)
        .bind(snapshot.current_period_start.map(|t| *t.as_datetime()))
        .bind(snapshot.current_period_end.map(|t| *t.as_datetime()))
        .bind(snapshot.cancel_at_period_end)
        .bind(card.map(|c| c.brand.as_str()))
        .bind(card.map(|c| c.last4.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to upsert subscription snapshot: {}", e))
                .with_detail("customer_id", snapshot.customer_id.as_str())
        })?;

        Ok(())
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT stripe_customer_id, subscription_id, status, price_id,
                   current_period_start, current_period_end, cancel_at_period_end,
                   payment_method_brand, payment_method_last4
            FROM billing_subscriptions
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(customer_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find subscription snapshot: {}", e)))?;

        row.map(SubscriptionSnapshot::try_from).transpose()
    }
}
