use async_trait::async_trait;
use orderly_core::{ChargeRequest, ChargeStatus, PaymentGateway, PaymentGatewayError, PaymentOutcome};
use tracing::{debug, warn};

use super::{describe_transport_error, endpoint};

pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, PaymentGatewayError> {
        let url = endpoint(&self.base_url, "payments");
        debug!(order_id = request.order_id, amount = request.amount, "Charging order");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::Unavailable(describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PaymentGatewayError::Unavailable(describe_transport_error(&e)))?;
        let decoded = serde_json::from_slice::<PaymentOutcome>(&body);

        let mut outcome = match decoded {
            Ok(outcome) => outcome,
            Err(e) if status.is_success() => {
                return Err(PaymentGatewayError::Malformed(e.to_string()));
            }
            Err(_) => {
                return Err(PaymentGatewayError::Rejected { status: status.as_u16() });
            }
        };

        if outcome.order_id != request.order_id {
            return Err(PaymentGatewayError::Malformed(format!(
                "outcome for order {} returned while charging order {}",
                outcome.order_id, request.order_id
            )));
        }

        // A non-2xx answer is a decline whatever the body claims
        if !status.is_success() && outcome.status != ChargeStatus::Failed {
            warn!(
                order_id = request.order_id,
                status = status.as_u16(),
                "Gateway answered non-OK with a non-failed outcome, treating as declined"
            );
            outcome.status = ChargeStatus::Failed;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{build_http_client, stub};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn gateway() -> HttpPaymentGateway {
        let router = Router::new().route(
            "/api/payments",
            post(|Json(req): Json<Value>| async move {
                let order_id = req["orderId"].as_i64().unwrap_or_default();
                let amount = req["amount"].as_i64().unwrap_or_default();
                match req["description"].as_str().unwrap_or_default() {
                    "decline" => (
                        StatusCode::OK,
                        Json(json!({"orderId": order_id, "amount": amount, "status": "failed", "errorMessage": "card_declined"})),
                    ),
                    "bad-request" => (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"orderId": order_id, "amount": amount, "status": "success"})),
                    ),
                    "explode" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"}))),
                    "garbage" => (StatusCode::OK, Json(json!({"nope": 1}))),
                    "wrong-order" => (
                        StatusCode::OK,
                        Json(json!({"orderId": order_id + 1, "amount": amount, "status": "success", "transactionId": "tx_x"})),
                    ),
                    _ => (
                        StatusCode::OK,
                        Json(json!({"orderId": order_id, "amount": amount, "status": "success", "transactionId": format!("tx_{}", order_id)})),
                    ),
                }
            }),
        );
        let base = stub::serve(router).await;
        HttpPaymentGateway::new(build_http_client(Duration::from_secs(5)).unwrap(), base)
    }

    fn charge(order_id: i64, description: &str) -> ChargeRequest {
        ChargeRequest {
            order_id,
            amount: 5000,
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_charge() {
        let outcome = gateway().await.charge(&charge(1, "book")).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.transaction_id.as_deref(), Some("tx_1"));
        assert_eq!(outcome.amount, 5000);
    }

    #[tokio::test]
    async fn test_declined_charge_is_an_outcome() {
        let outcome = gateway().await.charge(&charge(2, "decline")).await.unwrap();
        assert_eq!(outcome.status, ChargeStatus::Failed);
        assert_eq!(outcome.error_message.as_deref(), Some("card_declined"));
    }

    #[tokio::test]
    async fn test_non_ok_with_outcome_is_declined() {
        let outcome = gateway().await.charge(&charge(3, "bad-request")).await.unwrap();
        assert_eq!(outcome.status, ChargeStatus::Failed);
    }

    #[tokio::test]
    async fn test_protocol_failures() {
        let gateway = gateway().await;
        assert!(matches!(
            gateway.charge(&charge(4, "explode")).await,
            Err(PaymentGatewayError::Rejected { status: 500 })
        ));
        assert!(matches!(
            gateway.charge(&charge(5, "garbage")).await,
            Err(PaymentGatewayError::Malformed(_))
        ));
        assert!(matches!(
            gateway.charge(&charge(6, "wrong-order")).await,
            Err(PaymentGatewayError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let base = stub::dead_url().await;
        let gateway = HttpPaymentGateway::new(build_http_client(Duration::from_secs(1)).unwrap(), base);
        assert!(matches!(
            gateway.charge(&charge(1, "book")).await,
            Err(PaymentGatewayError::Unavailable(_))
        ));
    }
}
