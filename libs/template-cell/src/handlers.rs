use std::sync::Arc;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::ChangeFeed;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;

use crate::models::{Template, TemplateList, TemplateRequest, TemplateSearchQuery};
use crate::services::TemplateService;

pub async fn list_templates(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Query(query): Query<TemplateSearchQuery>,
) -> Result<Json<TemplateList>, AppError> {
    let service = TemplateService::new(&config, feed);
    Ok(Json(service.list_templates(query.search.as_deref(), auth.token()).await?))
}

pub async fn create_template(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(feed): Extension<ChangeFeed>,
    AppJson(request): AppJson<TemplateRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TemplateService::new(&config, feed);

    let template = service.create_template(request, &user.id, auth.token()).await?;

    Ok(Json(json!({
        "message": "Template created!",
        "template": template
    })))
}

pub async fn get_template(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(template_id): Path<String>,
) -> Result<Json<Template>, AppError> {
    let service = TemplateService::new(&config, feed);
    Ok(Json(service.get_template(&template_id, auth.token()).await?))
}

pub async fn update_template(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(template_id): Path<String>,
    AppJson(request): AppJson<TemplateRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TemplateService::new(&config, feed);

    let template = service.update_template(&template_id, request, auth.token()).await?;

    Ok(Json(json!({
        "message": "Template updated!",
        "template": template
    })))
}

pub async fn delete_template(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(template_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = TemplateService::new(&config, feed);

    service.delete_template(&template_id, auth.token()).await?;

    Ok(Json(json!({ "message": "Template deleted" })))
}
