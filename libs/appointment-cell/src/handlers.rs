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

use crate::models::{Appointment, AppointmentList, AppointmentRequest, AppointmentSearchQuery};
use crate::services::AppointmentService;

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<AppointmentList>, AppError> {
    let service = AppointmentService::new(&config, feed);
    Ok(Json(service.list_appointments(query.search.as_deref(), auth.token()).await?))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(feed): Extension<ChangeFeed>,
    AppJson(request): AppJson<AppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config, feed);

    let appointment = service.create_appointment(request, &user.id, auth.token()).await?;

    Ok(Json(json!({
        "message": "Appointment scheduled!",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentService::new(&config, feed);
    Ok(Json(service.get_appointment(&appointment_id, auth.token()).await?))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(appointment_id): Path<String>,
    AppJson(request): AppJson<AppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config, feed);

    let appointment = service.update_appointment(&appointment_id, request, auth.token()).await?;

    Ok(Json(json!({
        "message": "Appointment updated!",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config, feed);

    service.delete_appointment(&appointment_id, auth.token()).await?;

    Ok(Json(json!({ "message": "Appointment deleted" })))
}
