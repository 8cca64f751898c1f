use async_trait::async_trait;
use orderly_core::{Notification, NotificationReceipt, Notifier, NotifyError};

use super::{describe_transport_error, endpoint};

pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<NotificationReceipt, NotifyError> {
        let response = self
            .client
            .post(endpoint(&self.base_url, "notifications"))
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::Unavailable(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected { status: status.as_u16() });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NotifyError::Unavailable(describe_transport_error(&e)))?;
        serde_json::from_slice(&body).map_err(|e| NotifyError::Malformed(e.to_string()))
    }
}
