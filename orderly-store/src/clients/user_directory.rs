use async_trait::async_trait;
use orderly_core::{User, UserDirectory, UserLookupError};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{describe_transport_error, endpoint};

pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn get_user(&self, id: i64) -> Result<User, UserLookupError> {
        let url = endpoint(&self.base_url, &format!("users/{}", id));
        debug!(user_id = id, %url, "Requesting user");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(user_id = id, "Failed to connect to user directory: {}", e);
            UserLookupError::Unavailable(describe_transport_error(&e))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UserLookupError::NotFound(id));
        }
        if !status.is_success() {
            warn!(user_id = id, status = status.as_u16(), "User directory returned non-OK status");
            return Err(UserLookupError::Unavailable(format!(
                "user directory returned status {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UserLookupError::Unavailable(describe_transport_error(&e)))?;
        let user: User = serde_json::from_slice(&body)
            .map_err(|e| UserLookupError::Malformed(e.to_string()))?;

        if user.id != id {
            return Err(UserLookupError::Malformed(format!(
                "asked for user {} but received user {}",
                id, user.id
            )));
        }

        debug!(user_id = id, "Retrieved user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{build_http_client, stub};
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use std::time::Duration;

    async fn directory(timeout: Duration) -> HttpUserDirectory {
        let router = Router::new()
            .route(
                "/api/users/{id}",
                get(|Path(id): Path<i64>| async move {
                    match id {
                        1 => Ok(Json(serde_json::json!({"id": 1, "name": "Ada", "email": "ada@example.com"}))),
                        2 => Ok(Json(serde_json::json!({"id": 3, "name": "Bob", "email": "bob@example.com"}))),
                        3 => Ok(Json(serde_json::json!({"unexpected": true}))),
                        4 => Err(AxumStatus::INTERNAL_SERVER_ERROR),
                        5 => {
                            tokio::time::sleep(Duration::from_secs(2)).await;
                            Ok(Json(serde_json::json!({"id": 5, "name": "Slow", "email": "slow@example.com"})))
                        }
                        _ => Err(AxumStatus::NOT_FOUND),
                    }
                }),
            );
        let base = stub::serve(router).await;
        HttpUserDirectory::new(build_http_client(timeout).unwrap(), base)
    }

    #[tokio::test]
    async fn test_existing_user() {
        let users = directory(Duration::from_secs(5)).await;
        let user = users.get_user(1).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let users = directory(Duration::from_secs(5)).await;
        assert!(matches!(users.get_user(999).await, Err(UserLookupError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_malformed_responses() {
        let users = directory(Duration::from_secs(5)).await;
        assert!(matches!(users.get_user(2).await, Err(UserLookupError::Malformed(_))));
        assert!(matches!(users.get_user(3).await, Err(UserLookupError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_server_error_and_timeout_are_unavailable() {
        let users = directory(Duration::from_millis(300)).await;
        assert!(matches!(users.get_user(4).await, Err(UserLookupError::Unavailable(_))));
        assert!(matches!(users.get_user(5).await, Err(UserLookupError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_directory() {
        let base = stub::dead_url().await;
        let users = HttpUserDirectory::new(build_http_client(Duration::from_secs(1)).unwrap(), base);
        assert!(matches!(users.get_user(1).await, Err(UserLookupError::Unavailable(_))));
    }
}
