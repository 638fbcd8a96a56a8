use tokio::sync::broadcast;
use tracing::debug;

use crate::collections::Collection;

const FEED_CAPACITY: usize = 256;

pub type ChangeReceiver = broadcast::Receiver<Collection>;

/// In-process notification that a collection was written through this API.
///
/// Receivers only learn *which* collection changed; they re-read the full
/// contents themselves, so a lagged receiver loses nothing but redundant
/// wake-ups.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<Collection>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, collection: Collection) {
        match self.sender.send(collection) {
            Ok(receivers) => debug!("Notified {} subscriber(s) of change to {}", receivers, collection),
            Err(_) => debug!("No subscribers for change to {}", collection),
        }
    }

    pub fn subscribe(&self) -> ChangeReceiver {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let feed = ChangeFeed::new();
        let mut first = feed.subscribe();
        let mut second = feed.clone().subscribe();

        feed.publish(Collection::Patients);

        assert_eq!(first.recv().await.unwrap(), Collection::Patients);
        assert_eq!(second.recv().await.unwrap(), Collection::Patients);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        ChangeFeed::new().publish(Collection::Templates);
    }
}
