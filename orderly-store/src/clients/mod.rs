//! reqwest-backed adapters for the user directory, payment gateway and notifier.

pub mod notifier;
pub mod payment;
pub mod user_directory;

pub use notifier::HttpNotifier;
pub use payment::HttpPaymentGateway;
pub use user_directory::HttpUserDirectory;

use std::time::Duration;

/// Shared client for all collaborator calls; the timeout bounds every request.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}
