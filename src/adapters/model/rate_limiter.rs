//! Token bucket rate limiter for model API requests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Token bucket with continuous refill.
///
/// Capacity equals the refill rate, so a full second of burst is allowed
/// before acquires start sleeping.
#[derive(Clone)]
pub struct TokenBucketRateLimiter {
    state: Arc<Mutex<BucketState>>,
    capacity: f64,
    refill_rate: f64,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucketRateLimiter {
    /// `requests_per_second` must be positive; validated at config load.
    pub fn new(requests_per_second: f64) -> Self {
        let rps = requests_per_second.max(f64::MIN_POSITIVE);
        Self {
            state: Arc::new(Mutex::new(BucketState {
                tokens: rps,
                last_refill: Instant::now(),
            })),
            capacity: rps,
            refill_rate: rps,
        }
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let elapsed = state.last_refill.elapsed().as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
                state.last_refill = Instant::now();

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                // Lock released while sleeping
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_rate)
            };
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_within_capacity_does_not_block() {
        let limiter = TokenBucketRateLimiter::new(5.0);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn exhausted_bucket_waits_for_refill() {
        let limiter = TokenBucketRateLimiter::new(10.0);
        for _ in 0..10 {
            limiter.acquire().await;
        }
        let start = Instant::now();
        limiter.acquire().await;
        // One token refills in ~100ms at 10 rps
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
