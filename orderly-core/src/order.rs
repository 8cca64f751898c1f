use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Payment state of an order. Moves at most once, out of `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Only `pending -> success` and `pending -> failed` are legal.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Success)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(CoreError::ValidationError(format!(
                "unknown payment status '{}'",
                other
            ))),
        }
    }
}

/// A validated order-creation request that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: i64,
    pub amount: i64,
    pub description: Option<String>,
}

impl NewOrder {
    pub fn new(user_id: i64, amount: i64, description: Option<String>) -> CoreResult<Self> {
        if user_id <= 0 || amount <= 0 {
            return Err(CoreError::ValidationError(
                "Invalid userId or amount".to_string(),
            ));
        }

        let description = description.filter(|d| !d.trim().is_empty());

        Ok(Self {
            user_id,
            amount,
            description,
        })
    }
}

/// The persisted order record, owned by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub payment_status: PaymentStatus,
}

impl Order {
    /// Build the pending record for a freshly assigned id.
    pub fn pending(id: i64, new_order: &NewOrder) -> Self {
        Self {
            id,
            user_id: new_order.user_id,
            amount: new_order.amount,
            description: new_order.description.clone(),
            payment_status: PaymentStatus::Pending,
        }
    }

    /// Apply the single payment status transition.
    pub fn settle(&mut self, status: PaymentStatus) -> CoreResult<()> {
        if !self.payment_status.can_transition_to(status) {
            return Err(CoreError::InvalidTransition {
                from: self.payment_status,
                to: status,
            });
        }
        self.payment_status = status;
        Ok(())
    }
}
