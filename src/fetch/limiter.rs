use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Per-host sliding-window rate limiter. Counters live in-process only and
/// are mutated solely on the fetch path; `reserve` holds the lock for the
/// whole read-modify-write so the window math stays consistent.
pub struct RateLimiter {
    max_per_minute: usize,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        Self {
            max_per_minute,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until the host is under its per-minute cap, then count this
    /// request against the window.
    pub async fn acquire(&self, host: &str) {
        let wait = self.reserve(host, Instant::now());
        if !wait.is_zero() {
            tracing::debug!(host, wait_ms = wait.as_millis() as u64, "rate limit wait");
            tokio::time::sleep(wait).await;
        }
    }

    /// Record a request at `now` and return how long the caller must wait
    /// before actually issuing it. Zero when under the cap.
    fn reserve(&self, host: &str, now: Instant) -> Duration {
        let mut windows = self.windows.lock().expect("limiter mutex poisoned");
        let window = windows.entry(host.to_string()).or_default();

        while let Some(front) = window.front() {
            if now.duration_since(*front) >= WINDOW {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < self.max_per_minute {
            window.push_back(now);
            return Duration::ZERO;
        }

        // At the cap: the slot opens when the oldest entry ages out.
        let oldest = *window.front().expect("window at cap cannot be empty");
        let wait = WINDOW - now.duration_since(oldest);
        window.push_back(now + wait);
        wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_cap_no_delay() {
        let limiter = RateLimiter::new(3);
        let t0 = Instant::now();
        for _ in 0..3 {
            assert_eq!(limiter.reserve("example.org", t0), Duration::ZERO);
        }
    }

    #[test]
    fn delays_once_cap_reached() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        assert_eq!(limiter.reserve("example.org", t0), Duration::ZERO);
        assert_eq!(limiter.reserve("example.org", t0 + Duration::from_secs(10)), Duration::ZERO);

        // Third request inside the window must wait until the first expires.
        let wait = limiter.reserve("example.org", t0 + Duration::from_secs(20));
        assert_eq!(wait, Duration::from_secs(40));
    }

    #[test]
    fn window_resets_after_a_minute() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        assert_eq!(limiter.reserve("example.org", t0), Duration::ZERO);
        assert_eq!(
            limiter.reserve("example.org", t0 + Duration::from_secs(61)),
            Duration::ZERO
        );
    }

    #[test]
    fn hosts_are_independent() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        assert_eq!(limiter.reserve("a.example.org", t0), Duration::ZERO);
        assert_eq!(limiter.reserve("b.example.org", t0), Duration::ZERO);
        assert!(limiter.reserve("a.example.org", t0 + Duration::from_secs(1)) > Duration::ZERO);
    }
}
