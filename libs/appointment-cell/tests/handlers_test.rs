use std::sync::Arc;
use assert_matches::assert_matches;
use axum::{
    extract::{Extension, Path, Query, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use appointment_cell::handlers::*;
use appointment_cell::models::{AppointmentRequest, AppointmentSearchQuery, AppointmentStatus};
use shared_config::AppConfig;
use shared_database::{ChangeFeed, Collection};
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

async fn setup() -> (MockServer, Arc<AppConfig>, TestUser, String) {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(server.uri()).to_arc();
    let user = TestUser::staff("desk@clinic.test");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));
    (server, config, user, token)
}

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn appointment_form() -> AppointmentRequest {
    AppointmentRequest {
        patient_id: Some("p1".to_string()),
        date: Some("2024-06-01".to_string()),
        time: Some("09:15".to_string()),
        doctor_name: Some("Dr. John Smith".to_string()),
        status: None,
        notes: Some("Bring previous reports".to_string()),
    }
}

async fn mount_patients(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient("p1", "Jane Doe"),
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_appointments_resolves_patient_names() {
    let (server, config, _, token) = setup().await;
    mount_patients(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("order", "date.asc,time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment("a1", "p1", "2024-06-01", "09:00"),
            MockSupabaseResponses::appointment("a2", "p-deleted", "2024-06-02", "10:30"),
        ])))
        .mount(&server)
        .await;

    let list = list_appointments(
        State(config),
        create_auth_header(&token),
        Extension(ChangeFeed::new()),
        Query(AppointmentSearchQuery::default()),
    ).await.unwrap().0;

    assert_eq!(list.total, 2);
    assert_eq!(list.appointments[0].patient_name, "Jane Doe");
    assert_eq!(list.appointments[1].patient_name, "Unknown");
}

#[tokio::test]
async fn test_list_appointments_search_by_patient_name() {
    let (server, config, _, token) = setup().await;
    mount_patients(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment("a1", "p1", "2024-06-01", "09:00"),
            MockSupabaseResponses::appointment("a2", "p2", "2024-06-02", "10:30"),
        ])))
        .mount(&server)
        .await;

    let list = list_appointments(
        State(config),
        create_auth_header(&token),
        Extension(ChangeFeed::new()),
        Query(AppointmentSearchQuery { search: Some("jane".to_string()) }),
    ).await.unwrap().0;

    assert_eq!(list.appointments.len(), 1);
    assert_eq!(list.appointments[0].appointment.id, "a1");
}

#[tokio::test]
async fn test_create_appointment_defaults_to_scheduled() {
    let (server, config, user, token) = setup().await;
    let feed = ChangeFeed::new();
    let mut changes = feed.subscribe();

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment("a-new", "p1", "2024-06-01", "09:15")
        ])))
        .mount(&server)
        .await;

    let response = create_appointment(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        Extension(feed),
        AppJson(appointment_form()),
    ).await.unwrap().0;

    assert_eq!(response["message"], "Appointment scheduled!");
    assert_eq!(response["appointment"]["time"], "09:15");
    assert_eq!(changes.try_recv().unwrap(), Collection::Appointments);

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["status"], "Scheduled");
    assert_eq!(sent["date"], "2024-06-01");
    assert_eq!(sent["created_by"], user.id);
}

#[tokio::test]
async fn test_create_appointment_requires_time() {
    let (_server, config, user, token) = setup().await;

    let result = create_appointment(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        Extension(ChangeFeed::new()),
        AppJson(AppointmentRequest { time: None, ..appointment_form() }),
    ).await;

    assert_matches!(result, Err(AppError::ValidationError(msg)) if msg == "time is required");
}

#[tokio::test]
async fn test_update_appointment_status() {
    let (server, config, _, token) = setup().await;

    let mut updated = MockSupabaseResponses::appointment("a1", "p1", "2024-06-01", "09:15");
    updated["status"] = json!("No Show");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .mount(&server)
        .await;

    let response = update_appointment(
        State(config),
        create_auth_header(&token),
        Extension(ChangeFeed::new()),
        Path("a1".to_string()),
        AppJson(AppointmentRequest { status: Some(AppointmentStatus::NoShow), ..appointment_form() }),
    ).await.unwrap().0;

    assert_eq!(response["appointment"]["status"], "No Show");
}

#[tokio::test]
async fn test_delete_missing_appointment() {
    let (server, config, _, token) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = delete_appointment(
        State(config),
        create_auth_header(&token),
        Extension(ChangeFeed::new()),
        Path("a404".to_string()),
    ).await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}
