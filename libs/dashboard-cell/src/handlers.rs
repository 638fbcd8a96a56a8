use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};

use crate::models::{DashboardQuery, DashboardSummary};
use crate::service::DashboardService;

#[axum::debug_handler]
pub async fn get_dashboard(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let service = DashboardService::new(&config);
    Ok(Json(service.summary(&user, query.hour, auth.token()).await?))
}
