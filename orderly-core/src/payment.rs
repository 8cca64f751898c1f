use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::order::PaymentStatus;

/// Result of a single charge attempt. A charge outcome is never pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Success,
    Failed,
}

impl From<ChargeStatus> for PaymentStatus {
    fn from(status: ChargeStatus) -> Self {
        match status {
            ChargeStatus::Success => PaymentStatus::Success,
            ChargeStatus::Failed => PaymentStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub order_id: i64,
    pub amount: i64,
    pub description: String,
}

/// What the gateway reported for one charge. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub order_id: i64,
    pub amount: i64,
    pub status: ChargeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        self.status == ChargeStatus::Success
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
    #[error("malformed payment gateway response: {0}")]
    Malformed(String),
    #[error("payment gateway rejected the request with status {status}")]
    Rejected { status: u16 },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge an order. A declined charge is an `Ok` outcome with `Failed` status;
    /// `Err` is reserved for transport or protocol failures.
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, PaymentGatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_decodes_gateway_body() {
        let outcome: PaymentOutcome = serde_json::from_str(
            r#"{"orderId":3,"amount":900,"status":"failed","errorMessage":"card_declined"}"#,
        )
        .unwrap();
        assert_eq!(outcome.status, ChargeStatus::Failed);
        assert_eq!(outcome.transaction_id, None);
        assert_eq!(outcome.error_message.as_deref(), Some("card_declined"));
        assert_eq!(PaymentStatus::from(outcome.status), PaymentStatus::Failed);
    }

    #[test]
    fn test_pending_is_not_a_charge_status() {
        let result = serde_json::from_str::<PaymentOutcome>(
            r#"{"orderId":3,"amount":900,"status":"pending"}"#,
        );
        assert!(result.is_err());
    }
}
