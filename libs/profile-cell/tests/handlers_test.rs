use std::sync::Arc;
use assert_matches::assert_matches;
use axum::{
    extract::{Extension, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};

use profile_cell::handlers::*;
use profile_cell::models::ProfileRequest;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

async fn setup() -> (MockServer, Arc<AppConfig>, TestUser, String) {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(server.uri()).to_arc();
    let user = TestUser::staff("jane@clinic.test").with_display_name("Dr. Jane Roe");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));
    (server, config, user, token)
}

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

#[tokio::test]
async fn test_get_stored_profile() {
    let (server, config, user, token) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_profile(&user.id, &user.email)
        ])))
        .mount(&server)
        .await;

    let response = get_profile(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
    ).await.unwrap().0;

    assert!(response.stored);
    assert_eq!(response.profile.specialty.as_deref(), Some("General Practitioner"));
}

#[tokio::test]
async fn test_get_profile_prefills_when_missing() {
    let (server, config, user, token) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let response = get_profile(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
    ).await.unwrap().0;

    assert!(!response.stored);
    assert_eq!(response.profile.name, "Dr. Jane Roe");
    assert_eq!(response.profile.email.as_deref(), Some("jane@clinic.test"));
    assert_eq!(response.profile.phone.as_deref(), Some(""));
}

#[tokio::test]
async fn test_update_profile_upserts_and_syncs_display_name() {
    let (server, config, user, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(header("Prefer", "resolution=merge-duplicates,return=representation"))
        .and(body_partial_json(json!({ "id": user.id, "email": user.email, "name": "Dr. Jane Q. Roe" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": user.id,
            "name": "Dr. Jane Q. Roe",
            "email": user.email,
            "phone": "+1 555 0199",
            "specialty": null,
            "updated_at": "2024-06-01T10:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(body_partial_json(json!({ "data": { "display_name": "Dr. Jane Q. Roe" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": user.id })))
        .expect(1)
        .mount(&server)
        .await;

    let response: Value = update_profile(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        AppJson(ProfileRequest {
            name: Some("Dr. Jane Q. Roe".to_string()),
            phone: Some("+1 555 0199".to_string()),
            specialty: None,
        }),
    ).await.unwrap().0;

    assert_eq!(response["message"], "Profile updated successfully!");
    assert_eq!(response["profile"]["name"], "Dr. Jane Q. Roe");
}

#[tokio::test]
async fn test_update_profile_rejects_bad_phone() {
    let (server, config, user, token) = setup().await;

    let result = update_profile(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        AppJson(ProfileRequest {
            name: Some("Dr. Jane Roe".to_string()),
            phone: Some("12".to_string()),
            specialty: None,
        }),
    ).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_profile_reports_store_failure() {
    let (server, config, user, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("permission denied for table users")
        ))
        .mount(&server)
        .await;

    let result = update_profile(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        AppJson(ProfileRequest { name: Some("Dr. Jane Roe".to_string()), ..Default::default() }),
    ).await;

    assert_matches!(result, Err(AppError::ExternalService(msg)) if msg.contains("permission denied"));
}
