use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use orderly_core::repository::{OrderRepository, StoreError};
use orderly_core::{NewOrder, Order, PaymentStatus};
use tokio::sync::RwLock;

/// Order store kept in process memory. Ids start at 1.
pub struct InMemoryOrderRepository {
    orders: RwLock<BTreeMap<i64, Order>>,
    next_id: AtomicI64,
    fail_inserts: AtomicBool,
    fail_updates: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            fail_inserts: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
        }
    }

    /// Make subsequent inserts fail with a backend error.
    #[cfg(any(test, feature = "test-util"))]
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent payment status updates fail with a backend error.
    #[cfg(any(test, feature = "test-util"))]
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable(what: &str) -> StoreError {
    StoreError::backend(std::io::Error::other(format!("{} unavailable", what)))
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert_pending(&self, order: &NewOrder) -> Result<Order, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(unavailable("order insert"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Order::pending(id, order);
        self.orders.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_payment_status(&self, id: i64, status: PaymentStatus) -> Result<(), StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(unavailable("order update"));
        }

        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let from = order.payment_status;
        order
            .settle(status)
            .map_err(|_| StoreError::InvalidTransition { from, to: status })
    }

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_order_lifecycle() {
        let repo = InMemoryOrderRepository::new();

        let order = repo
            .insert_pending(&NewOrder::new(1, 5000, Some("book".to_string())).unwrap())
            .await
            .unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.payment_status, PaymentStatus::Pending);

        repo.update_payment_status(order.id, PaymentStatus::Success).await.unwrap();
        let stored = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_invalid_transition() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.insert_pending(&NewOrder::new(1, 10, None).unwrap()).await.unwrap();

        repo.update_payment_status(order.id, PaymentStatus::Failed).await.unwrap();
        let result = repo.update_payment_status(order.id, PaymentStatus::Success).await;
        assert!(matches!(result, Err(StoreError::InvalidTransition { .. })));

        let result = repo.update_payment_status(99, PaymentStatus::Success).await;
        assert!(matches!(result, Err(StoreError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_list_by_user_newest_first() {
        let repo = InMemoryOrderRepository::new();
        for (user, amount) in [(1, 10), (2, 20), (1, 30)] {
            repo.insert_pending(&NewOrder::new(user, amount, None).unwrap()).await.unwrap();
        }

        let amounts: Vec<i64> = repo.list_by_user(1).await.unwrap().iter().map(|o| o.amount).collect();
        assert_eq!(amounts, vec![30, 10]);
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let repo = InMemoryOrderRepository::new();
        repo.fail_inserts(true);
        assert!(repo.insert_pending(&NewOrder::new(1, 10, None).unwrap()).await.is_err());
        assert!(repo.is_empty().await);

        repo.fail_inserts(false);
        let order = repo.insert_pending(&NewOrder::new(1, 10, None).unwrap()).await.unwrap();
        repo.fail_updates(true);
        assert!(repo.update_payment_status(order.id, PaymentStatus::Success).await.is_err());
        assert_eq!(repo.get(order.id).await.unwrap().unwrap().payment_status, PaymentStatus::Pending);
    }
}
