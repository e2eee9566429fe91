//! Per-client sliding-window limiter for form submissions.
//!
//! Each client identifier keeps the instants of its recently accepted
//! submissions. Instants older than the window are pruned whenever the
//! identifier is checked again.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

pub const MAX_SUBMISSIONS: usize = 5;
pub const WINDOW: Duration = Duration::from_millis(3_600_000);
pub const MAX_TRACKED_CLIENTS: usize = 10_000;
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// Marks a limiter that has never swept.
const NEVER_SWEPT: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Accepted submissions allowed inside one window.
    pub max_submissions: usize,
    pub window: Duration,
    /// Above this many identifiers, identifiers with nothing left inside the
    /// window are swept out.
    pub max_tracked_clients: usize,
    /// While over the cap, sweeps run at most once per interval.
    pub min_sweep_interval: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_submissions: MAX_SUBMISSIONS,
            window: WINDOW,
            max_tracked_clients: MAX_TRACKED_CLIENTS,
            min_sweep_interval: MIN_SWEEP_INTERVAL,
        }
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    entries: DashMap<String, VecDeque<Instant>>,
    created_at: Instant,
    /// Milliseconds after `created_at` of the last sweep, plus one.
    last_sweep: AtomicU64,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            entries: DashMap::new(),
            created_at: Instant::now(),
            last_sweep: AtomicU64::new(NEVER_SWEPT),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Records a submission for `identifier` at `now` unless the identifier
    /// already used up its budget for the window ending at `now`.
    ///
    /// A rejected attempt is not recorded. The whole check runs under the
    /// identifier's shard lock, so concurrent calls for the same identifier
    /// never exceed `max_submissions`.
    pub fn check_and_record(&self, identifier: &str, now: Instant) -> bool {
        let allowed = {
            let mut submissions = self.entries.entry(identifier.to_owned()).or_default();
            submissions.retain(|ts| self.is_within_window(*ts, now));

            if submissions.len() >= self.policy.max_submissions {
                false
            } else {
                submissions.push_back(now);
                true
            }
        };

        if allowed
            && self.entries.len() > self.policy.max_tracked_clients
            && self.claim_sweep(now)
        {
            self.evict_stale(now);
        }

        allowed
    }

    pub fn check(&self, identifier: &str) -> bool {
        self.check_and_record(identifier, Instant::now())
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    pub fn reset(&self) {
        self.entries.clear();
    }

    fn is_within_window(&self, ts: Instant, now: Instant) -> bool {
        now.saturating_duration_since(ts) < self.policy.window
    }

    /// Claims the sweep at `now` unless one ran less than `min_sweep_interval`
    /// ago. Only one of several concurrent callers wins the claim.
    fn claim_sweep(&self, now: Instant) -> bool {
        let now_ms = now.saturating_duration_since(self.created_at).as_millis() as u64 + 1;
        let last = self.last_sweep.load(Ordering::Acquire);
        let interval_ms = self.policy.min_sweep_interval.as_millis() as u64;

        if last != NEVER_SWEPT && now_ms.saturating_sub(last) < interval_ms {
            return false;
        }

        self.last_sweep
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[tracing::instrument(name = "Evicting stale rate-limit entries", skip(self, now))]
    fn evict_stale(&self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, submissions| {
            submissions
                .back()
                .is_some_and(|last| self.is_within_window(*last, now))
        });
        tracing::debug!(
            evicted = before.saturating_sub(self.entries.len()),
            remaining = self.entries.len(),
            "Swept rate-limit entries outside the window"
        );
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}
