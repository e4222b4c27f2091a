//! In-memory request throttle.
//!
//! Fixed-window counter: O(1) memory and O(1) cost per check, at the cost
//! of allowing up to twice the quota across a window boundary. The store is
//! owned by the limiter and injected where it is used, so tests get a fresh
//! one per case and a shared external cache could back it later without
//! touching the algorithm.
//!
//! State is process-local only. Running several instances multiplies the
//! effective quota - this is not a distributed limiter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::config;
use crate::error::ApiError;
use crate::middleware::auth::AuthStudent;

#[derive(Debug)]
struct RateLimitEntry {
    count: u32,
    window_resets_at: Instant,
}

#[derive(Debug, PartialEq)]
pub enum Decision {
    Allow,
    Reject { retry_after_secs: u64 },
}

pub struct RateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn from_config() -> Self {
        let api = &config::config().api;
        Self::new(
            api.rate_limit_requests,
            Duration::from_secs(api.rate_limit_window_secs),
        )
    }

    /// Check one request against the quota.
    ///
    /// A fresh or elapsed window starts a new entry at count 1. A rejected
    /// request never increments the counter.
    pub fn check(&self, identifier: &str, now: Instant) -> Decision {
        let mut entries = self.lock_entries();

        match entries.get_mut(identifier) {
            Some(entry) if now < entry.window_resets_at => {
                if entry.count >= self.max_requests {
                    Decision::Reject {
                        retry_after_secs: retry_after_secs(entry.window_resets_at, now),
                    }
                } else {
                    entry.count += 1;
                    Decision::Allow
                }
            }
            _ => {
                entries.insert(
                    identifier.to_string(),
                    RateLimitEntry {
                        count: 1,
                        window_resets_at: now + self.window,
                    },
                );
                Decision::Allow
            }
        }
    }

    /// Drop every entry whose window has already elapsed.
    ///
    /// Called on a fixed interval independent of traffic to bound memory
    /// under churn of distinct identifiers.
    pub fn sweep(&self, now: Instant) {
        self.lock_entries()
            .retain(|_, entry| now < entry.window_resets_at);
    }

    /// Number of identifiers currently tracked
    pub fn tracked_identifiers(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether an identifier currently has an entry
    pub fn is_tracked(&self, identifier: &str) -> bool {
        self.lock_entries().contains_key(identifier)
    }

    /// Spawn the periodic sweep task
    pub fn start_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                limiter.sweep(Instant::now());
            }
        })
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        // A poisoned lock only means another thread panicked mid-update;
        // the map itself is still usable
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Seconds until the window resets, rounded up, never zero
fn retry_after_secs(window_resets_at: Instant, now: Instant) -> u64 {
    let remaining = window_resets_at.saturating_duration_since(now);
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

/// Identifier precedence: resolved student id, then the forwarded network
/// origin, then a shared anonymous bucket.
///
/// The forwarded header is trivially spoofable by a direct client; known
/// gap, kept as-is.
pub fn identifier_for(auth: Option<&AuthStudent>, forwarded_for: Option<&str>) -> String {
    if let Some(auth) = auth {
        return auth.student_id.to_string();
    }

    forwarded_for
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string())
        .filter(|origin| !origin.is_empty())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Rate limiting middleware by student or network origin
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identifier = identifier_for(
        request.extensions().get::<AuthStudent>(),
        request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok()),
    );

    match limiter.check(&identifier, Instant::now()) {
        Decision::Allow => Ok(next.run(request).await),
        Decision::Reject { retry_after_secs } => Err(ApiError::too_many_requests(
            format!("Too many requests. Try again in {} seconds.", retry_after_secs),
            retry_after_secs,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn allows_until_quota_then_rejects() {
        let limiter = RateLimiter::new(3, WINDOW);
        let t0 = Instant::now();

        assert_eq!(limiter.check("student-1", t0), Decision::Allow);
        assert_eq!(limiter.check("student-1", t0 + Duration::from_secs(2)), Decision::Allow);
        assert_eq!(limiter.check("student-1", t0 + Duration::from_secs(5)), Decision::Allow);

        match limiter.check("student-1", t0 + Duration::from_secs(10)) {
            Decision::Reject { retry_after_secs } => {
                assert!(retry_after_secs > 0 && retry_after_secs <= 60);
            }
            Decision::Allow => panic!("fourth request within the window must be rejected"),
        }
    }

    #[test]
    fn identifiers_are_tracked_independently() {
        let limiter = RateLimiter::new(1, WINDOW);
        let t0 = Instant::now();

        assert_eq!(limiter.check("a", t0), Decision::Allow);
        assert_eq!(limiter.check("b", t0), Decision::Allow);
        assert!(matches!(limiter.check("a", t0), Decision::Reject { .. }));
        assert!(matches!(limiter.check("b", t0), Decision::Reject { .. }));
    }

    #[test]
    fn rejected_requests_do_not_consume_quota() {
        let limiter = RateLimiter::new(2, WINDOW);
        let t0 = Instant::now();

        assert_eq!(limiter.check("s", t0), Decision::Allow);
        assert_eq!(limiter.check("s", t0), Decision::Allow);

        // Hammering while rejected must not push the reset further out
        // or grow the count
        for i in 0..10 {
            let now = t0 + Duration::from_secs(i);
            assert!(matches!(limiter.check("s", now), Decision::Reject { .. }));
        }

        // Next window opens as scheduled
        assert_eq!(limiter.check("s", t0 + Duration::from_secs(61)), Decision::Allow);
    }

    #[test]
    fn window_rollover_resets_count_to_one() {
        let limiter = RateLimiter::new(3, WINDOW);
        let t0 = Instant::now();

        for _ in 0..3 {
            assert_eq!(limiter.check("s", t0), Decision::Allow);
        }
        assert!(matches!(limiter.check("s", t0), Decision::Reject { .. }));

        // Fresh window: full quota available again
        let t1 = t0 + Duration::from_secs(61);
        assert_eq!(limiter.check("s", t1), Decision::Allow);
        assert_eq!(limiter.check("s", t1), Decision::Allow);
        assert_eq!(limiter.check("s", t1), Decision::Allow);
        assert!(matches!(limiter.check("s", t1), Decision::Reject { .. }));
    }

    #[test]
    fn retry_hint_rounds_up_and_is_never_zero() {
        let limiter = RateLimiter::new(1, WINDOW);
        let t0 = Instant::now();

        assert_eq!(limiter.check("s", t0), Decision::Allow);
        match limiter.check("s", t0 + Duration::from_millis(59_500)) {
            Decision::Reject { retry_after_secs } => assert_eq!(retry_after_secs, 1),
            Decision::Allow => panic!("expected rejection"),
        }
    }

    #[test]
    fn sweep_removes_only_elapsed_entries() {
        let limiter = RateLimiter::new(5, WINDOW);
        let t0 = Instant::now();

        limiter.check("stale", t0);
        limiter.check("fresh", t0 + Duration::from_secs(30));
        assert_eq!(limiter.tracked_identifiers(), 2);

        // "stale" expired at t0+60, "fresh" expires at t0+90
        limiter.sweep(t0 + Duration::from_secs(70));
        assert!(!limiter.is_tracked("stale"));
        assert!(limiter.is_tracked("fresh"));
        assert_eq!(limiter.tracked_identifiers(), 1);
    }

    #[test]
    fn identifier_prefers_student_then_origin_then_anonymous() {
        let student_id = Uuid::new_v4();
        let auth = AuthStudent {
            user_id: Uuid::new_v4(),
            student_id,
            school_id: Uuid::new_v4(),
            email: "s@school.example".to_string(),
        };

        assert_eq!(identifier_for(Some(&auth), Some("10.0.0.1")), student_id.to_string());
        assert_eq!(identifier_for(None, Some("10.0.0.1, 172.16.0.1")), "10.0.0.1");
        assert_eq!(identifier_for(None, Some("  ")), "anonymous");
        assert_eq!(identifier_for(None, None), "anonymous");
    }
}
