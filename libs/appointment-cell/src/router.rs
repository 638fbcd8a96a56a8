// libs/appointment-cell/src/router.rs
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

pub fn appointment_routes(state: Arc<AppConfig>, feed: ChangeFeed) -> Router {
    // All appointment operations require authentication
    Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::create_appointment))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .layer(Extension(feed))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
