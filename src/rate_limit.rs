use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// Expired windows are swept once per this many checks
const PURGE_EVERY: u64 = 1024;

// Rate limit entry - tracks requests per client identity
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Rejected { retry_after: Duration },
}

/// Per-client admission counter.
///
/// Implementations must make `check_and_increment` atomic per identity:
/// two concurrent calls for the same identity may not both observe the
/// last free slot.
pub trait QuotaStore: Send + Sync {
    fn check_and_increment(&self, identity: &str) -> QuotaDecision;
}

/// Fixed-window quota held in process memory.
pub struct InMemoryQuota {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
    checks: AtomicU64,
    purge_every: u64,
}

impl InMemoryQuota {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            checks: AtomicU64::new(0),
            purge_every: PURGE_EVERY,
        }
    }

    pub fn with_purge_every(mut self, checks: u64) -> Self {
        self.purge_every = checks.max(1);
        self
    }

    pub fn check_at(&self, identity: &str, now: Instant) -> QuotaDecision {
        let decision = self.admit(identity, now);

        // guard from admit() is gone; retain() needs every shard lock
        if self.checks.fetch_add(1, Ordering::Relaxed) % self.purge_every == self.purge_every - 1 {
            self.purge_expired(now);
        }
        decision
    }

    /// Drop identities whose window has run out.
    pub fn purge_expired(&self, now: Instant) {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.window_start) < self.window);
        tracing::debug!(removed = before.saturating_sub(self.entries.len()), "Purged expired quota windows");
    }

    fn admit(&self, identity: &str, now: Instant) -> QuotaDecision {
        // the entry guard holds the shard lock until we return
        let mut entry = self
            .entries
            .entry(identity.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        let elapsed = now.saturating_duration_since(entry.window_start);

        // window expired..? Reset it
        if elapsed >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.limit {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.window_start));
            return QuotaDecision::Rejected { retry_after };
        }

        entry.count += 1;
        QuotaDecision::Allowed
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}

impl QuotaStore for InMemoryQuota {
    fn check_and_increment(&self, identity: &str) -> QuotaDecision {
        self.check_at(identity, Instant::now())
    }
}
