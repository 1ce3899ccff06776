//! Per-user transaction velocity over a trailing window.
//!
//! Counting scans only the most recent [`RECENT_SCAN_LIMIT`] rows of the
//! whole ledger rather than the user's full history. When other users'
//! traffic fills that window, older in-window transactions of this user are
//! not seen and the count comes out low. A per-user time-bucketed index
//! would remove that blind spot at the cost of different scores under load.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::Transaction;
use crate::ports::{RepositoryResult, TransactionRepository};

pub const RECENT_SCAN_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct VelocityTracker {
    repository: Arc<dyn TransactionRepository>,
}

impl VelocityTracker {
    pub fn new(repository: Arc<dyn TransactionRepository>) -> Self {
        Self { repository }
    }

    /// Number of `user_id`'s transactions created within the last
    /// `window_seconds`, boundary included.
    pub async fn count_recent(&self, user_id: &str, window_seconds: i64) -> RepositoryResult<usize> {
        self.count_recent_at(user_id, window_seconds, Utc::now()).await
    }

    pub async fn count_recent_at(
        &self,
        user_id: &str,
        window_seconds: i64,
        now: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let recent = self.repository.list_recent(RECENT_SCAN_LIMIT).await?;
        let count = count_within_window(&recent, user_id, Duration::seconds(window_seconds), now);
        debug!(user_id, window_seconds, count, scanned = recent.len(), "velocity counted");
        Ok(count)
    }
}

/// Rows with an unparseable `created_at` are skipped, not treated as errors.
pub fn count_within_window(
    transactions: &[Transaction],
    user_id: &str,
    window: Duration,
    now: DateTime<Utc>,
) -> usize {
    let cutoff = now - window;
    transactions
        .iter()
        .filter(|tx| tx.user_id == user_id)
        .filter_map(Transaction::created_at_utc)
        .filter(|created_at| *created_at >= cutoff)
        .count()
}
