pub mod dispatcher;
pub mod memory;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod orchestrator;

pub use dispatcher::{DispatcherHandle, NotificationDispatcher};
pub use memory::InMemoryOrderRepository;
pub use orchestrator::{CreateOrder, OrderError, OrderOrchestrator, OrderPlacement};
