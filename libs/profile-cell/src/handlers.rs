use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};
use shared_utils::extractor::AppJson;

use crate::models::{ProfileRequest, ProfileResponse};
use crate::services::ProfileService;

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<ProfileResponse>, AppError> {
    let service = ProfileService::new(&config);
    Ok(Json(service.get_profile(&user, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<ProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ProfileService::new(&config);

    let profile = service.update_profile(&user, request, auth.token()).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully!",
        "profile": profile
    })))
}
