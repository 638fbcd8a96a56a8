use std::sync::Arc;
use axum::{middleware, routing::get, Extension, Router};
use shared_config::AppConfig;
use shared_database::ChangeFeed;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_patient_router(config: Arc<AppConfig>, feed: ChangeFeed) -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route("/{id}", get(get_patient).put(update_patient).delete(delete_patient))
        .layer(Extension(feed))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
