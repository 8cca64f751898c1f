use std::sync::Arc;

use orderly_core::{Notification, Notifier};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Fire-and-forget front of the notification worker pool.
///
/// Cloning is cheap; every clone feeds the same bounded queue. Callers are never
/// blocked and never see the delivery outcome, which only shows up in the logs.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

/// Owns the worker tasks. `join` returns once every dispatcher clone is dropped
/// and the queue has drained.
pub struct DispatcherHandle {
    workers: Vec<JoinHandle<()>>,
}

impl NotificationDispatcher {
    pub fn spawn(
        notifier: Arc<dyn Notifier>,
        workers: usize,
        capacity: usize,
    ) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..workers.max(1))
            .map(|worker_id| tokio::spawn(run_worker(worker_id, rx.clone(), notifier.clone())))
            .collect();

        (Self { tx }, DispatcherHandle { workers })
    }

    /// Queue a notification without waiting. Returns `false` when it had to be dropped.
    pub fn dispatch(&self, notification: Notification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => true,
            Err(TrySendError::Full(n)) => {
                warn!(order_id = n.order_id, "Notification queue full, dropping notification");
                false
            }
            Err(TrySendError::Closed(n)) => {
                warn!(order_id = n.order_id, "Notification workers stopped, dropping notification");
                false
            }
        }
    }
}

impl DispatcherHandle {
    pub async fn join(self) {
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("Notification worker panicked: {}", e);
            }
        }
    }
}

async fn run_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Notification>>>,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        // Lock only while waiting for the next job so other workers can deliver in parallel
        let next = { rx.lock().await.recv().await };
        let Some(notification) = next else { break };

        match notifier.notify(&notification).await {
            Ok(receipt) => info!(
                worker_id,
                order_id = notification.order_id,
                status = %receipt.status,
                "Notification delivered"
            ),
            Err(e) => warn!(
                worker_id,
                order_id = notification.order_id,
                "Notification failed for order {}: {}",
                notification.order_id,
                e
            ),
        }
    }
    debug!(worker_id, "Notification worker stopped");
}
