use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_database::ChangeFeed;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn template_routes(state: Arc<AppConfig>, feed: ChangeFeed) -> Router {
    Router::new()
        .route("/", get(handlers::list_templates).post(handlers::create_template))
        .route(
            "/{id}",
            get(handlers::get_template)
                .put(handlers::update_template)
                .delete(handlers::delete_template),
        )
        .layer(Extension(feed))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
