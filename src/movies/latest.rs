use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::omdb::MovieSummary;

/// Handle for one batch request, ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub sequence: u64,
    pub movies: Arc<Vec<MovieSummary>>,
}

/// Keeps the result of the most recently requested batch. A batch that
/// completes after a newer one was requested is dropped.
#[derive(Debug, Default)]
pub struct LatestBatch {
    issued: AtomicU64,
    current: RwLock<Snapshot>,
}

impl LatestBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns whether `movies` became the current batch.
    pub async fn complete(&self, ticket: Ticket, movies: Vec<MovieSummary>) -> bool {
        let mut current = self.current.write().await;
        let newest = self.issued.load(Ordering::SeqCst);
        if ticket.0 != newest || ticket.0 <= current.sequence {
            debug!(
                ticket = ticket.0,
                newest = newest,
                "Discarding stale movie batch"
            );
            return false;
        }
        *current = Snapshot {
            sequence: ticket.0,
            movies: Arc::new(movies),
        };
        true
    }

    pub async fn current(&self) -> Snapshot {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[&str]) -> Vec<MovieSummary> {
        ids.iter()
            .map(|id| MovieSummary {
                id: id.to_string(),
                title: id.to_string(),
                year: "1999".to_string(),
                media_type: "movie".to_string(),
                poster_url: "https://example.com/x.jpg".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let latest = LatestBatch::new();
        let snap = latest.current().await;
        assert_eq!(snap.sequence, 0);
        assert!(snap.movies.is_empty());
    }

    #[tokio::test]
    async fn test_tickets_increase() {
        let latest = LatestBatch::new();
        let a = latest.begin();
        let b = latest.begin();
        assert!(b > a);
        assert_eq!(b.sequence(), a.sequence() + 1);
    }

    #[tokio::test]
    async fn test_stale_completion_discarded() {
        let latest = LatestBatch::new();
        let first = latest.begin();
        let second = latest.begin();

        assert!(latest.complete(second, batch(&["new"])).await);
        assert!(!latest.complete(first, batch(&["old"])).await);

        let snap = latest.current().await;
        assert_eq!(snap.sequence, second.sequence());
        assert_eq!(snap.movies[0].id, "new");
    }

    #[tokio::test]
    async fn test_older_completion_before_newer_is_dropped() {
        let latest = LatestBatch::new();
        let first = latest.begin();
        let second = latest.begin();

        assert!(!latest.complete(first, batch(&["old"])).await);
        assert!(latest.current().await.movies.is_empty());
        assert!(latest.complete(second, batch(&["new"])).await);
        assert_eq!(latest.current().await.movies[0].id, "new");
    }

    #[tokio::test]
    async fn test_double_completion_ignored() {
        let latest = LatestBatch::new();
        let t = latest.begin();
        assert!(latest.complete(t, batch(&["a"])).await);
        assert!(!latest.complete(t, batch(&["b"])).await);
        assert_eq!(latest.current().await.movies[0].id, "a");
    }
}
