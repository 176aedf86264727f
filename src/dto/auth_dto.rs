use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::user::UserResponse;

// Login / refresh response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

// Sesión actual
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub needs_renewal: bool,
}
