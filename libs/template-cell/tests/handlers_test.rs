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

use shared_config::AppConfig;
use shared_database::{ChangeFeed, Collection};
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};
use template_cell::handlers::*;
use template_cell::models::{TemplateRequest, TemplateSearchQuery};

async fn setup() -> (MockServer, Arc<AppConfig>, TestUser, String) {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(server.uri()).to_arc();
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));
    (server, config, user, token)
}

fn bearer(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

#[tokio::test]
async fn test_list_templates_search_matches_subject() {
    let (server, config, _, token) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::template("t1", "Appointment Reminder"),
            MockSupabaseResponses::template("t2", "Flu Shot"),
        ])))
        .mount(&server)
        .await;

    let list = list_templates(
        State(config),
        bearer(&token),
        Extension(ChangeFeed::new()),
        Query(TemplateSearchQuery { search: Some("flu shot SUBJECT".to_string()) }),
    ).await.unwrap().0;

    assert_eq!(list.total, 2);
    assert_eq!(list.templates.len(), 1);
    assert_eq!(list.templates[0].id, "t2");
}

#[tokio::test]
async fn test_create_template() {
    let (server, config, user, token) = setup().await;
    let feed = ChangeFeed::new();
    let mut changes = feed.subscribe();

    Mock::given(method("POST"))
        .and(path("/rest/v1/templates"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::template("t9", "Reminder")
        ])))
        .mount(&server)
        .await;

    let response = create_template(
        State(config),
        bearer(&token),
        Extension(user.to_user()),
        Extension(feed),
        AppJson(TemplateRequest {
            title: Some("Reminder".into()),
            subject: Some("Reminder subject".into()),
            message: Some("Hello {name}".into()),
        }),
    ).await.unwrap().0;

    assert_eq!(response["message"], "Template created!");
    assert_eq!(response["template"]["id"], "t9");
    assert_eq!(changes.try_recv().unwrap(), Collection::Templates);
}

#[tokio::test]
async fn test_create_template_requires_subject() {
    let (_server, config, user, token) = setup().await;

    let result = create_template(
        State(config),
        bearer(&token),
        Extension(user.to_user()),
        Extension(ChangeFeed::new()),
        AppJson(TemplateRequest {
            title: Some("Reminder".into()),
            subject: None,
            message: Some("Hello".into()),
        }),
    ).await;

    assert_matches!(result, Err(AppError::ValidationError(msg)) if msg == "subject is required");
}

#[tokio::test]
async fn test_update_missing_template() {
    let (server, config, _, token) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/templates"))
        .and(query_param("id", "eq.gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = update_template(
        State(config),
        bearer(&token),
        Extension(ChangeFeed::new()),
        Path("gone".to_string()),
        AppJson(TemplateRequest {
            title: Some("a".into()),
            subject: Some("b".into()),
            message: Some("c".into()),
        }),
    ).await;

    assert_matches!(result, Err(AppError::NotFound(msg)) if msg == "Template not found");
}

#[tokio::test]
async fn test_delete_template() {
    let (server, config, _, token) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/templates"))
        .and(query_param("id", "eq.t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::template("t1", "Reminder")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = delete_template(
        State(config),
        bearer(&token),
        Extension(ChangeFeed::new()),
        Path("t1".to_string()),
    ).await.unwrap().0;

    assert_eq!(response["message"], "Template deleted");
}

#[tokio::test]
async fn test_get_template() {
    let (server, config, _, token) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/templates"))
        .and(query_param("id", "eq.t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::template("t1", "Reminder")
        ])))
        .mount(&server)
        .await;

    let template = get_template(
        State(config),
        bearer(&token),
        Extension(ChangeFeed::new()),
        Path("t1".to_string()),
    ).await.unwrap().0;

    assert_eq!(template.title, "Reminder");
    assert_eq!(template.message, "Hello {name}, this is a reminder from your clinic.");
}
