//! Publish/subscribe registry for the latest recommendation results.
//!
//! Observers either read the most recent snapshot or subscribe to every
//! result set published after they joined. Slow subscribers may miss
//! intermediate snapshots; the latest one is always available.

use std::sync::Arc;

use data_loader::AggregatedResult;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

const DEFAULT_FEED_CAPACITY: usize = 16;

pub type Snapshot = Arc<Vec<AggregatedResult>>;

#[derive(Clone)]
pub struct RecommendationFeed {
    latest: Arc<RwLock<Snapshot>>,
    sender: broadcast::Sender<Snapshot>,
}

impl RecommendationFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// `capacity` bounds how many unseen snapshots a subscriber can lag behind
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            latest: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            sender,
        }
    }

    /// Replace the latest snapshot and notify every subscriber
    pub async fn publish(&self, results: Vec<AggregatedResult>) {
        let snapshot = Arc::new(results);
        *self.latest.write().await = Arc::clone(&snapshot);

        // No subscribers is not an error
        let delivered = self.sender.send(snapshot).unwrap_or(0);
        debug!("Published snapshot to {} subscribers", delivered);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    pub async fn latest(&self) -> Snapshot {
        Arc::clone(&*self.latest.read().await)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for RecommendationFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    fn result(id: &str, stars: f64) -> AggregatedResult {
        AggregatedResult {
            product_id: id.to_string(),
            stars,
            category: "books".to_string(),
        }
    }

    #[tokio::test]
    async fn test_latest_starts_empty() {
        let feed = RecommendationFeed::new();
        assert!(feed.latest().await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_updates_latest() {
        let feed = RecommendationFeed::new();
        feed.publish(vec![result("p1", 4.0)]).await;

        let latest = feed.latest().await;
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].product_id, "p1");
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_snapshot() {
        let feed = RecommendationFeed::new();
        let mut first = feed.subscribe();
        let mut second = feed.clone().subscribe();
        assert_eq!(feed.subscriber_count(), 2);

        feed.publish(vec![result("p1", 4.0), result("p2", 3.0)]).await;

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_removed() {
        let feed = RecommendationFeed::new();
        let receiver = feed.subscribe();
        drop(receiver);

        assert_eq!(feed.subscriber_count(), 0);
        feed.publish(vec![result("p1", 1.0)]).await;
        assert_eq!(feed.latest().await.len(), 1);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_to_latest() {
        let feed = RecommendationFeed::with_capacity(1);
        let mut receiver = feed.subscribe();

        feed.publish(vec![result("old", 1.0)]).await;
        feed.publish(vec![result("new", 2.0)]).await;

        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(1))));
        let snapshot = receiver.recv().await.unwrap();
        assert_eq!(snapshot[0].product_id, "new");
    }
}
