use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::ChangeFeed;
use shared_models::{auth::User, error::AppError};
use shared_utils::extractor::AppJson;

use crate::models::{
    AudienceRequest, AudienceView, Campaign, CampaignList, CampaignRequest, CampaignSearchQuery,
};
use crate::services::CampaignService;

#[axum::debug_handler]
pub async fn list_campaigns(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Query(query): Query<CampaignSearchQuery>,
) -> Result<Json<CampaignList>, AppError> {
    let service = CampaignService::new(&config, feed);
    Ok(Json(service.list_campaigns(query.search.as_deref(), auth.token()).await?))
}

#[axum::debug_handler]
pub async fn create_campaign(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(feed): Extension<ChangeFeed>,
    AppJson(request): AppJson<CampaignRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CampaignService::new(&config, feed);

    let campaign = service.create_campaign(request, &user.id, auth.token()).await?;

    Ok(Json(json!({
        "message": "Campaign created!",
        "campaign": campaign
    })))
}

#[axum::debug_handler]
pub async fn get_campaign(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Campaign>, AppError> {
    let service = CampaignService::new(&config, feed);
    Ok(Json(service.get_campaign(&campaign_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn update_campaign(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(campaign_id): Path<String>,
    AppJson(request): AppJson<CampaignRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CampaignService::new(&config, feed);

    let campaign = service.update_campaign(&campaign_id, request, auth.token()).await?;

    Ok(Json(json!({
        "message": "Campaign updated!",
        "campaign": campaign
    })))
}

#[axum::debug_handler]
pub async fn delete_campaign(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CampaignService::new(&config, feed);

    service.delete_campaign(&campaign_id, auth.token()).await?;

    Ok(Json(json!({ "message": "Campaign deleted" })))
}

#[axum::debug_handler]
pub async fn pick_audience(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    AppJson(request): AppJson<AudienceRequest>,
) -> Result<Json<AudienceView>, AppError> {
    let service = CampaignService::new(&config, feed);
    Ok(Json(service.pick_audience(request, auth.token()).await?))
}
