use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::HeaderMap,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::extractor::{extract_bearer_token, AppJson};
use shared_utils::jwt;
use shared_utils::validation::{is_valid_email, required, ValidationError};

use crate::models::{AuthError, LoginRequest, SessionInfo, SessionResponse};

pub async fn login(
    State(config): State<Arc<AppConfig>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = required("email", request.email).map_err(AuthError::from)?;
    if !is_valid_email(&email) {
        return Err(AuthError::from(ValidationError::invalid("email", "must be a valid email address")).into());
    }
    let password = required("password", request.password).map_err(AuthError::from)?;

    debug!("Signing in {}", email);

    let client = SupabaseClient::new(&config);
    let session = client
        .sign_in_with_password(&email, &password)
        .await
        .map_err(|e| AuthError::SignInRejected(e.to_string()))?;

    let access_token = session
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or(AuthError::MissingAccessToken)?
        .to_string();

    info!("Staff member {} signed in", email);

    Ok(Json(SessionResponse {
        access_token,
        refresh_token: session.get("refresh_token").and_then(Value::as_str).map(str::to_string),
        expires_in: session.get("expires_in").and_then(Value::as_u64),
        user: session.get("user").cloned().unwrap_or(Value::Null),
        message: "Welcome back!".to_string(),
    }))
}

pub async fn logout(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let client = SupabaseClient::new(&config);

    client
        .sign_out(auth.token())
        .await
        .map_err(|e| AuthError::SignOutFailed(e.to_string()))?;

    info!("User {} signed out", user.id);

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn session(Extension(user): Extension<User>) -> Json<SessionInfo> {
    Json(SessionInfo {
        display_name: user.greeting_name(),
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let user = jwt::validate_token(&token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;
    let valid = jwt::validate_token(&token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}
