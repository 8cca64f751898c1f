use std::sync::Arc;

use orderly_core::repository::{OrderRepository, StoreError};
use orderly_core::{
    ChargeRequest, CoreError, NewOrder, Notification, Order, PaymentGateway, PaymentOutcome, PaymentStatus,
    UserDirectory, UserLookupError,
};
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::dispatcher::NotificationDispatcher;

/// Inbound order-creation request, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub user_id: i64,
    pub amount: i64,
    pub description: Option<String>,
}

/// Composite result of one workflow run.
///
/// `payment` is present when the charge succeeded; `payment_error` explains a
/// failed charge. Exactly one of them is set.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacement {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_error: Option<String>,
}

/// Failures that abort the workflow. A failed charge or notification is not one
/// of these; both are folded into a successful `OrderPlacement`.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    InvalidInput(#[from] CoreError),

    #[error("User validation failed: {0}")]
    UserValidationFailed(#[from] UserLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Drives user lookup, order persistence, payment and notification for one order.
pub struct OrderOrchestrator {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserDirectory>,
    payments: Arc<dyn PaymentGateway>,
    notifications: NotificationDispatcher,
}

impl OrderOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserDirectory>,
        payments: Arc<dyn PaymentGateway>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            orders,
            users,
            payments,
            notifications,
        }
    }

    pub async fn create_order(&self, request: CreateOrder) -> Result<OrderPlacement, OrderError> {
        let span = info_span!(
            "create_order",
            workflow_id = %Uuid::new_v4(),
            user_id = request.user_id,
            order_id = tracing::field::Empty,
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: CreateOrder) -> Result<OrderPlacement, OrderError> {
        // 1. Validate before touching anything remote
        let new_order = NewOrder::new(request.user_id, request.amount, request.description)
            .map_err(OrderError::InvalidInput)?;

        // 2. Resolve the user; nothing is persisted if this fails
        let user = self.users.get_user(new_order.user_id).await.map_err(|e| {
            warn!("User validation failed: {}", e);
            OrderError::UserValidationFailed(e)
        })?;

        // 3. Persist the pending order
        let mut order = self.orders.insert_pending(&new_order).await.map_err(|e| {
            error!("Insert error: {}", e);
            OrderError::Storage(e)
        })?;
        Span::current().record("order_id", order.id);
        info!(amount = order.amount, "Order persisted as pending");

        // 4. Charge
        let charge = ChargeRequest {
            order_id: order.id,
            amount: order.amount,
            description: order.description.clone().unwrap_or_default(),
        };
        let (status, payment, payment_error) = match self.payments.charge(&charge).await {
            Ok(outcome) if outcome.is_success() => (PaymentStatus::Success, Some(outcome), None),
            Ok(outcome) => {
                let reason = outcome
                    .error_message
                    .unwrap_or_else(|| "declined".to_string());
                warn!(reason = %reason, "Payment declined for order {}", order.id);
                (PaymentStatus::Failed, None, Some(format!("payment failed: {}", reason)))
            }
            Err(e) => {
                error!("Payment failed for order {}: {}", order.id, e);
                (PaymentStatus::Failed, None, Some(format!("payment failed: {}", e)))
            }
        };

        // 5. Record the outcome; a failed write is logged, not reported
        self.record_payment_status(&mut order, status).await;

        // 6. Notify in the background, success path only
        if let Some(outcome) = &payment {
            self.notifications.dispatch(Notification {
                order_id: order.id,
                payment_status: outcome.status.into(),
                amount: order.amount,
                user_email: user.email,
            });
        }

        info!(status = %order.payment_status, "Order workflow finished");
        Ok(OrderPlacement {
            order,
            payment,
            payment_error,
        })
    }

    async fn record_payment_status(&self, order: &mut Order, status: PaymentStatus) {
        if let Err(e) = self.orders.update_payment_status(order.id, status).await {
            error!("Failed to update payment status for order {}: {}", order.id, e);
        }
        if let Err(e) = order.settle(status) {
            error!("Order {} cannot be settled: {}", order.id, e);
        }
    }
}
