pub mod order;
pub mod payment;
pub mod user;
pub mod notification;
pub mod repository;

pub use order::{NewOrder, Order, PaymentStatus};
pub use payment::{ChargeRequest, ChargeStatus, PaymentGateway, PaymentGatewayError, PaymentOutcome};
pub use user::{User, UserDirectory, UserLookupError};
pub use notification::{Notification, NotificationReceipt, Notifier, NotifyError};
pub use repository::{OrderRepository, StoreError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid payment status transition from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
