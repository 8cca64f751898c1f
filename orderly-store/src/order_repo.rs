use async_trait::async_trait;
use orderly_core::repository::{OrderRepository, StoreError};
use orderly_core::{NewOrder, Order, PaymentStatus};
use sqlx::SqlitePool;

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    amount: i64,
    description: Option<String>,
    payment_status: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_status = row
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| StoreError::Corrupt(format!("order {}: {}", row.id, e)))?;

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            description: row.description,
            payment_status,
        })
    }
}

const SELECT_ORDER: &str =
    "SELECT id, user_id, amount, description, payment_status FROM orders";

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn insert_pending(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let result = sqlx::query(
            "INSERT INTO orders (user_id, amount, description, payment_status) VALUES (?, ?, ?, 'pending')",
        )
        .bind(order.user_id)
        .bind(order.amount)
        .bind(order.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Order::pending(result.last_insert_rowid(), order))
    }

    async fn update_payment_status(&self, id: i64, status: PaymentStatus) -> Result<(), StoreError> {
        if status == PaymentStatus::Pending {
            return Err(StoreError::InvalidTransition {
                from: PaymentStatus::Pending,
                to: status,
            });
        }

        // Conditional on the row still being pending, so the transition is one-way
        // even without a surrounding transaction.
        let result = sqlx::query(
            "UPDATE orders SET payment_status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND payment_status = 'pending'",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get(id).await? {
            Some(current) => Err(StoreError::InvalidTransition {
                from: current.payment_status,
                to: status,
            }),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE id = ?", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Order::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE user_id = ? ORDER BY id DESC",
            SELECT_ORDER
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
