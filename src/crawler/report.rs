//! Crawl statistics

use chrono::{DateTime, Utc};

/// Counters for a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Books written to the roster
    pub books: usize,

    /// Book pages visited
    pub branches: usize,

    /// Book pages abandoned after a transport error
    pub failed_branches: usize,

    /// Statements written to per-book artifacts
    pub leaves_emitted: usize,

    /// Chapter pages that produced no statement
    pub leaves_skipped: usize,

    /// Chapter pages whose header named a different book than the branch owner
    pub identity_mismatches: usize,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            books: 0,
            branches: 0,
            failed_branches: 0,
            leaves_emitted: 0,
            leaves_skipped: 0,
            identity_mismatches: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Returns true if every visited page produced a statement
    pub fn is_clean(&self) -> bool {
        self.failed_branches == 0 && self.leaves_skipped == 0 && self.identity_mismatches == 0
    }

    /// Logs a one-line summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Crawl finished: {} books, {} book pages ({} failed), {} commentaries written, {} skipped, {} identity mismatches, {}s",
            self.books,
            self.branches,
            self.failed_branches,
            self.leaves_emitted,
            self.leaves_skipped,
            self.identity_mismatches,
            self.duration_seconds().unwrap_or_default()
        );
    }
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self::new()
    }
}
