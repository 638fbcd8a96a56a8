use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::TypedHeader;
use futures::Stream;
use headers::{authorization::Bearer, Authorization};
use tracing::info;

use shared_config::AppConfig;
use shared_database::{ChangeFeed, SupabaseClient};
use shared_models::{auth::User, error::AppError};

use crate::models::subscribable;
use crate::snapshots::snapshot_stream;

pub async fn subscribe(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(feed): Extension<ChangeFeed>,
    Path(name): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let collection = subscribable(&name)?;
    info!("User {} subscribed to {}", user.id, collection);

    // Subscribe before the first fetch so no write slips between the two.
    let changes = feed.subscribe();
    let stream = snapshot_stream(
        Arc::new(SupabaseClient::new(&config)),
        auth.token().to_string(),
        collection,
        changes,
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
