use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path};

use campaign_cell::router::campaign_routes;
use shared_config::AppConfig;
use shared_database::ChangeFeed;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

fn create_test_app(config: AppConfig) -> Router {
    campaign_routes(std::sync::Arc::new(config), ChangeFeed::new())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn setup() -> (MockServer, AppConfig, String) {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(server.uri()).to_app_config();
    let token = JwtTestUtils::create_test_token(&TestUser::default(), &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient("p1", "Jane Doe"),
            MockSupabaseResponses::patient("p2", "Janet Smith"),
            MockSupabaseResponses::patient("p3", "Mark Twain"),
        ])))
        .mount(&server)
        .await;

    (server, config, token)
}

async fn pick(config: AppConfig, token: &str, body: Value) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/audience")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_audience_requires_authentication() {
    let request = Request::builder()
        .method("POST")
        .uri("/audience")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = create_test_app(TestConfig::default().to_app_config())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_audience_initial_state() {
    let (_server, config, token) = setup().await;

    let view = pick(config, &token, json!({ "selected": [] })).await;

    assert_eq!(view["visible"].as_array().unwrap().len(), 3);
    assert_eq!(view["select_all_state"], "unchecked");
    assert_eq!(view["select_all_caption"], "Select All Patients");
    assert_eq!(view["summary"], "No patients selected");
    assert_eq!(view["badge"], Value::Null);
    assert_eq!(view["confirm_enabled"], false);
}

#[tokio::test]
async fn test_audience_select_all_matching_search() {
    let (_server, config, token) = setup().await;

    let view = pick(config, &token, json!({
        "selected": ["p3"],
        "search": "jan",
        "action": { "type": "toggle_all", "checked": true }
    })).await;

    assert_eq!(view["selected"], json!(["p3", "p1", "p2"]));
    assert_eq!(view["select_all_caption"], "Select all matching (2)");
    assert_eq!(view["select_all_state"], "checked");
    assert_eq!(view["summary"], "All 3 patients selected");
    assert_eq!(view["badge"], "All");
    assert_eq!(view["target_type"], "all");
}

#[tokio::test]
async fn test_audience_toggle_one_is_indeterminate() {
    let (_server, config, token) = setup().await;

    let view = pick(config, &token, json!({
        "selected": ["p1", "stale-id"],
        "action": { "type": "toggle", "id": "p2" }
    })).await;

    assert_eq!(view["selected"], json!(["p1", "p2"]));
    assert_eq!(view["select_all_state"], "indeterminate");
    assert_eq!(view["summary"], "2 of 3 selected");
    assert_eq!(view["badge"], "2");
    assert_eq!(view["target_type"], "single");
    assert_eq!(view["visible"][1]["checked"], true);
    assert_eq!(view["visible"][2]["checked"], false);
}

#[tokio::test]
async fn test_audience_clear() {
    let (_server, config, token) = setup().await;

    let view = pick(config, &token, json!({
        "selected": ["p1", "p2"],
        "action": { "type": "clear" }
    })).await;

    assert_eq!(view["selected"], json!([]));
    assert_eq!(view["confirm_enabled"], false);
}

#[tokio::test]
async fn test_audience_ignores_toggle_of_unknown_patient() {
    let (_server, config, token) = setup().await;

    let view = pick(config, &token, json!({
        "selected": ["p1", "p2", "p3"],
        "action": { "type": "toggle", "id": "ghost" }
    })).await;

    assert_eq!(view["selected"], json!(["p1", "p2", "p3"]));
    assert_eq!(view["summary"], "All 3 patients selected");
    assert_eq!(view["badge"], "All");
    assert_eq!(view["target_type"], "all");
}

#[tokio::test]
async fn test_audience_whitespace_search_is_a_filter() {
    let (_server, config, token) = setup().await;

    let view = pick(config, &token, json!({ "selected": [], "search": "  " })).await;

    assert_eq!(view["visible"], json!([]));
    assert_eq!(view["select_all_caption"], "Select all matching (0)");
    assert_eq!(view["select_all_state"], "unchecked");
}
