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

use crate::models::{Patient, PatientList, PatientRequest, PatientSearchQuery};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<PatientList>, AppError> {
    let service = PatientService::new(&config, feed);

    let list = service.list_patients(query.search.as_deref(), auth.token()).await?;

    Ok(Json(list))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(feed): Extension<ChangeFeed>,
    AppJson(request): AppJson<PatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config, feed);

    let patient = service.create_patient(request, &user.id, auth.token()).await?;

    Ok(Json(json!({
        "message": "Patient added!",
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let service = PatientService::new(&config, feed);

    let patient = service.get_patient(&patient_id, auth.token()).await?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(patient_id): Path<String>,
    AppJson(request): AppJson<PatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config, feed);

    let patient = service.update_patient(&patient_id, request, auth.token()).await?;

    Ok(Json(json!({
        "message": "Patient updated!",
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(feed): Extension<ChangeFeed>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config, feed);

    service.delete_patient(&patient_id, auth.token()).await?;

    Ok(Json(json!({ "message": "Patient deleted" })))
}
