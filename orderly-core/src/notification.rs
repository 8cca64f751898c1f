use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::order::PaymentStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub order_id: i64,
    pub payment_status: PaymentStatus,
    pub amount: i64,
    pub user_email: String,
}

/// Delivery acknowledgement, e.g. `sent` or `email_failed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    pub order_id: i64,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifier unavailable: {0}")]
    Unavailable(String),
    #[error("notification failed with status: {status}")]
    Rejected { status: u16 },
    #[error("malformed notifier response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<NotificationReceipt, NotifyError>;
}
