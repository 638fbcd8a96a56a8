use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shared_models::error::AppError;
use shared_utils::validation::ValidationError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Session handed back to the console after a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user: Value,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Login Failed: {0}")]
    SignInRejected(String),

    #[error("Sign-in response missing access token")]
    MissingAccessToken,

    #[error("Logout failed: {0}")]
    SignOutFailed(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(_) => AppError::ValidationError(message),
            AuthError::SignInRejected(_) => AppError::Auth(message),
            AuthError::MissingAccessToken | AuthError::SignOutFailed(_) => {
                AppError::ExternalService(message)
            }
        }
    }
}
