use chrono::{DateTime, Utc};
use thiserror::Error;

// 单个标识的登录失败计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttemptCounter {
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
}

// 单个客户端 IP 的请求计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRequestCounter {
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
    /// 本窗口内是否已经输出过限流警告
    pub warned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("Too many requests from this IP, please try again later.")]
    TooManyRequests { retry_after: u64 },

    #[error("Too many failed login attempts. Please try again later.")]
    TooManyAttempts {
        retry_after: u64,
        reset_time: DateTime<Utc>,
    },
}

impl RateLimitError {
    pub fn retry_after(&self) -> u64 {
        match self {
            RateLimitError::TooManyRequests { retry_after }
            | RateLimitError::TooManyAttempts { retry_after, .. } => *retry_after,
        }
    }
}
