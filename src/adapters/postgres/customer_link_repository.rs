//! PostgreSQL implementation of CustomerLinkRepository.

use crate::domain::billing::CustomerLink;
use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::CustomerLinkRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Unique constraints that make a second link for the same pair impossible.
const USER_PK: &str = "billing_customers_pkey";
const CUSTOMER_KEY: &str = "billing_customers_stripe_customer_id_key";

pub struct PostgresCustomerLinkRepository {
    pool: PgPool,
}

impl PostgresCustomerLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerLinkRow {
    user_id: String,
    stripe_customer_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerLinkRow> for CustomerLink {
    type Error = DomainError;

    fn try_from(row: CustomerLinkRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
        })?;
        let customer_id = CustomerId::new(row.stripe_customer_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid customer_id: {}", e))
        })?;

        Ok(CustomerLink::reconstitute(
            user_id,
            customer_id,
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

#[async_trait]
impl CustomerLinkRepository for PostgresCustomerLinkRepository {
    async fn insert(&self, link: &CustomerLink) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO billing_customers (user_id, stripe_customer_id, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(link.user_id().as_str())
        .bind(link.customer_id().as_str())
        .bind(link.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if matches!(db_err.constraint(), Some(USER_PK) | Some(CUSTOMER_KEY)) {
                    return DomainError::new(ErrorCode::Conflict, "Customer link already exists")
                        .with_detail("user_id", link.user_id().as_str());
                }
            }
            DomainError::database(format!("Failed to insert customer link: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<CustomerLink>, DomainError> {
        let row: Option<CustomerLinkRow> = sqlx::query_as(
            r#"
            SELECT user_id, stripe_customer_id, created_at
            FROM billing_customers
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find customer link: {}", e)))?;

        row.map(CustomerLink::try_from).transpose()
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerLink>, DomainError> {
        let row: Option<CustomerLinkRow> = sqlx::query_as(
            r#"
            SELECT user_id, stripe_customer_id, created_at
            FROM billing_customers
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(customer_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find customer link: {}", e)))?;

        row.map(CustomerLink::try_from).transpose()
    }
}
