mod limiter;
mod middleware;
mod types;

pub use limiter::RateLimiter;
pub use middleware::{client_ip, IpRateLimit, UNKNOWN_CLIENT};
pub use types::{IpRequestCounter, LoginAttemptCounter, RateLimitError};
