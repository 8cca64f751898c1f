use async_trait::async_trait;

use crate::order::{NewOrder, Order, PaymentStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("order {0} not found")]
    NotFound(i64),
    #[error("order payment status cannot move from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("stored order is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order in `pending` state and return it with its assigned id.
    async fn insert_pending(&self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Move a `pending` order to its final payment status.
    async fn update_payment_status(&self, id: i64, status: PaymentStatus) -> Result<(), StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// Orders for one user, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError>;
}
