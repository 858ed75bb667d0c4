//! User account models.

use serde::{Deserialize, Serialize};

/// Email and password pair used for sign-up and login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Result of `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Identifier of the logged-in user.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// User record returned by `POST /users/create` and `GET /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    /// User identifier.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Sessions owned by the user.
    #[serde(default)]
    pub session_ids: Vec<String>,
    /// Creation timestamp as sent by the backend.
    pub created_at: String,
}
