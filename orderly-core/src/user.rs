use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UserLookupError {
    #[error("user {0} not found")]
    NotFound(i64),
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
    #[error("malformed user directory response: {0}")]
    Malformed(String),
}

/// Read-only access to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<User, UserLookupError>;
}
