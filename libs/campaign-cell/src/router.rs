use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_database::ChangeFeed;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn campaign_routes(state: Arc<AppConfig>, feed: ChangeFeed) -> Router {
    Router::new()
        .route("/", get(handlers::list_campaigns).post(handlers::create_campaign))
        .route("/audience", post(handlers::pick_audience))
        .route(
            "/{id}",
            get(handlers::get_campaign)
                .put(handlers::update_campaign)
                .delete(handlers::delete_campaign),
        )
        .layer(Extension(feed))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
