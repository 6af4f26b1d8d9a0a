//! Model backends: the messages-API HTTP client and an offline mock.

pub mod client;
pub mod error;
pub mod mock;
pub mod rate_limiter;
pub mod retry;
pub mod types;

pub use client::HttpModelClient;
pub use error::ModelApiError;
pub use mock::MockModelClient;
pub use rate_limiter::TokenBucketRateLimiter;
pub use retry::RetryPolicy;
