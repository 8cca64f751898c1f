pub mod app_config;
pub mod clients;
pub mod database;
pub mod order_repo;

pub use clients::{build_http_client, HttpNotifier, HttpPaymentGateway, HttpUserDirectory};
pub use database::DbClient;
pub use order_repo::SqliteOrderRepository;
