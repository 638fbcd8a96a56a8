use std::sync::Arc;

use axum::{
    Json, Router,
    routing::get,
};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use campaign_cell::router::campaign_routes;
use dashboard_cell::router::dashboard_routes;
use patient_cell::router::create_patient_router;
use profile_cell::router::profile_routes;
use realtime_cell::router::realtime_routes;
use shared_config::AppConfig;
use shared_database::ChangeFeed;
use template_cell::router::template_routes;

async fn status() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "medcare-console-api" }))
}

pub fn create_router(state: Arc<AppConfig>, feed: ChangeFeed) -> Router {
    Router::new()
        .route("/", get(status))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", create_patient_router(state.clone(), feed.clone()))
        .nest("/appointments", appointment_routes(state.clone(), feed.clone()))
        .nest("/templates", template_routes(state.clone(), feed.clone()))
        .nest("/campaigns", campaign_routes(state.clone(), feed.clone()))
        .nest("/profile", profile_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state.clone()))
        .nest("/realtime", realtime_routes(state, feed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn app() -> Router {
        create_router(TestConfig::default().to_arc(), ChangeFeed::new())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        let config = TestConfig::default();
        let user = TestUser::staff("desk@clinic.test");
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_body(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_is_public() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cells_are_protected() {
        for uri in ["/patients", "/appointments", "/templates", "/campaigns", "/profile", "/dashboard", "/realtime/patients", "/auth/session"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

            let response = app().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_missing_field_reports_validation_error() {
        let request = post_json("/patients", json!({ "age": 30, "gender": "Male" }));

        let (status, body) = error_body(app().oneshot(request).await.unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Validation error: name is required" }));
    }

    #[tokio::test]
    async fn test_unknown_enum_value_is_a_json_bad_request() {
        let request = post_json("/patients", json!({ "name": "Jane Doe", "age": 30, "gender": "male" }));

        let (status, body) = error_body(app().oneshot(request).await.unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("unknown variant `male`"));
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_a_json_bad_request() {
        let request = post_json("/appointments", json!({ "patient_id": "p1", "status": 3 }));

        let (status, body) = error_body(app().oneshot(request).await.unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
