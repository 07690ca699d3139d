use async_trait::async_trait;
use sqlx::PgPool;

use eventgate_core::models::Order;
use eventgate_core::repository::{OrderRepository, RepositoryError};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Backend(Box::new(e))
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders
                (id, event_id, event_date,
                 ticket_adult_price, ticket_adult_quantity,
                 ticket_kid_price, ticket_kid_quantity,
                 total_price, barcode, user_id, status,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id)
        .bind(order.event_id)
        .bind(order.event_date)
        .bind(order.ticket_adult_price)
        .bind(order.ticket_adult_quantity)
        .bind(order.ticket_kid_price)
        .bind(order.ticket_kid_quantity)
        .bind(order.total_price)
        .bind(&order.barcode)
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The unique constraint on barcode is the authority on
            // uniqueness; a violation here means another request won the
            // race after our read-time pre-check.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::warn!(barcode = %order.barcode, "barcode conflict at insert time");
                Err(RepositoryError::DuplicateBarcode(order.barcode.clone()))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn barcode_exists(&self, barcode: &str) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE barcode = $1)")
            .bind(barcode)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)
    }
}
