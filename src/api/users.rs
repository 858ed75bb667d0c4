//! User account service.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::models::user::{Credentials, LoginResponse, UserResponse};
use crate::Result;

/// Signs users up and in, and looks them up.
#[derive(Debug, Clone)]
pub struct UserService {
    api: Arc<ApiClient>,
}

impl UserService {
    /// Create a service backed by `api`.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` when the email is already registered.
    pub async fn create_user(&self, credentials: &Credentials) -> Result<UserResponse> {
        self.api.post("/users/create", Some(credentials)).await
    }

    /// Log in.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (401) on bad credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.api.post("/users/login", Some(credentials)).await
    }

    /// Fetch a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (404) when the user does not exist.
    pub async fn get_user(&self, user_id: &str) -> Result<UserResponse> {
        self.api.get(&format!("/users/{user_id}")).await
    }

    /// List the session ids owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (404) when the user does not exist.
    pub async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<String>> {
        self.api.get(&format!("/users/{user_id}/sessions")).await
    }
}
