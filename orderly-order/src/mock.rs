//! Network-free collaborators for tests. Built with `test-util`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use orderly_core::{
    ChargeRequest, ChargeStatus, Notification, NotificationReceipt, Notifier, NotifyError,
    PaymentGateway, PaymentGatewayError, PaymentOutcome, User, UserDirectory, UserLookupError,
};
use tokio::sync::{watch, Mutex};

pub struct MockUserDirectory {
    users: HashMap<i64, User>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            unavailable: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every lookup fails as if the directory timed out.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    pub fn with_user(mut self, id: i64, name: &str, email: &str) -> Self {
        self.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn get_user(&self, id: i64) -> Result<User, UserLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(UserLookupError::Unavailable("request timed out".to_string()));
        }
        self.users.get(&id).cloned().ok_or(UserLookupError::NotFound(id))
    }
}

#[derive(Debug, Clone)]
enum ChargeBehavior {
    Approve,
    Decline(String),
    Unavailable,
}

pub struct MockPaymentGateway {
    behavior: ChargeBehavior,
    requests: Mutex<Vec<ChargeRequest>>,
}

impl MockPaymentGateway {
    /// Approves every charge with transaction id `tx_<order id>`.
    pub fn approving() -> Self {
        Self::with_behavior(ChargeBehavior::Approve)
    }

    pub fn declining(reason: &str) -> Self {
        Self::with_behavior(ChargeBehavior::Decline(reason.to_string()))
    }

    pub fn unavailable() -> Self {
        Self::with_behavior(ChargeBehavior::Unavailable)
    }

    fn with_behavior(behavior: ChargeBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, PaymentGatewayError> {
        self.requests.lock().await.push(request.clone());

        match &self.behavior {
            ChargeBehavior::Approve => Ok(PaymentOutcome {
                order_id: request.order_id,
                amount: request.amount,
                status: ChargeStatus::Success,
                transaction_id: Some(format!("tx_{}", request.order_id)),
                error_message: None,
            }),
            ChargeBehavior::Decline(reason) => Ok(PaymentOutcome {
                order_id: request.order_id,
                amount: request.amount,
                status: ChargeStatus::Failed,
                transaction_id: None,
                error_message: Some(reason.clone()),
            }),
            ChargeBehavior::Unavailable => Err(PaymentGatewayError::Unavailable(
                "connection refused".to_string(),
            )),
        }
    }
}

pub struct MockNotifier {
    fail: bool,
    gate: watch::Sender<bool>,
    attempts: AtomicUsize,
    sent: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            fail: false,
            gate: watch::Sender::new(true),
            attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Deliveries block until `resume` is called.
    pub fn paused() -> Self {
        let notifier = Self::new();
        notifier.gate.send_replace(false);
        notifier
    }

    pub fn resume(&self) {
        self.gate.send_replace(true);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    /// Poll until at least `count` deliveries were attempted. `false` on timeout.
    pub async fn wait_for_attempts(&self, count: usize, timeout: Duration) -> bool {
        let started = Instant::now();
        while self.attempts() < count {
            if started.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, notification: &Notification) -> Result<NotificationReceipt, NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.gate.subscribe();
        let opened = gate.wait_for(|open| *open).await.is_ok();
        if !opened {
            return Err(NotifyError::Unavailable("notifier shut down".to_string()));
        }

        if self.fail {
            return Err(NotifyError::Rejected { status: 503 });
        }

        self.sent.lock().await.push(notification.clone());
        Ok(NotificationReceipt {
            order_id: notification.order_id,
            status: "sent".to_string(),
        })
    }
}
