use std::sync::Arc;
use orderly_core::OrderRepository;
use orderly_order::OrderOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OrderOrchestrator>,
    pub order_repo: Arc<dyn OrderRepository>,
}
