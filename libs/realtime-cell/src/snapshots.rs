use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::Event;
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use shared_database::change_feed::ChangeReceiver;
use shared_database::{Collection, SupabaseClient};

use crate::models::{snapshot_order, Snapshot};

pub const SNAPSHOT_EVENT: &str = "snapshot";
pub const ERROR_EVENT: &str = "error";

struct Subscription {
    supabase: Arc<SupabaseClient>,
    auth_token: String,
    collection: Collection,
    changes: ChangeReceiver,
    primed: bool,
}

impl Subscription {
    /// Waits for the next write to the watched collection. `false` once the
    /// feed is gone.
    async fn next_change(&mut self) -> bool {
        loop {
            match self.changes.recv().await {
                Ok(changed) if changed == self.collection => return true,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber to {} lagged by {} change(s), resyncing", self.collection, skipped);
                    return true;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }

    async fn snapshot_event(&self) -> Event {
        let rows = self.supabase
            .select_all(self.collection, snapshot_order(self.collection), &self.auth_token)
            .await;

        let snapshot = match rows {
            Ok(documents) => Snapshot { collection: self.collection, documents },
            Err(e) => return Event::default().event(ERROR_EVENT).data(format!("{:#}", e)),
        };

        debug!("Sending {} snapshot with {} document(s)", self.collection, snapshot.documents.len());
        match Event::default().event(SNAPSHOT_EVENT).json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => Event::default().event(ERROR_EVENT).data(e.to_string()),
        }
    }
}

/// Live snapshots of one collection: the current contents immediately, then
/// again after every write published on the feed. Fetches run with the
/// subscriber's own token.
pub fn snapshot_stream(
    supabase: Arc<SupabaseClient>,
    auth_token: String,
    collection: Collection,
    changes: ChangeReceiver,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let subscription = Subscription {
        supabase,
        auth_token,
        collection,
        changes,
        primed: false,
    };

    stream::unfold(subscription, |mut sub| async move {
        if sub.primed {
            if !sub.next_change().await {
                return None;
            }
        } else {
            sub.primed = true;
        }

        let event = sub.snapshot_event().await;
        Some((Ok(event), sub))
    })
}
