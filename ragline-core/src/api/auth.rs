//! Account registration, login, and profile lookup.

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};
use crate::config::constants::routes;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token plus the minimal profile both auth endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub email: String,
    pub token: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl ApiClient {
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        self.post_json(routes::users::REGISTER, request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        self.post_json(routes::users::LOGIN, request).await
    }

    /// Profile behind the stored token; doubles as a token validity check.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get_json(routes::users::ME).await
    }
}
