use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::{IpRequestCounter, LoginAttemptCounter, RateLimitError};
use crate::config::{RateLimitConfig, MAX_WINDOW_SECS};

/// 进程内的双层限流器。
///
/// IP 闸门统计每个客户端地址在窗口内的请求数，用于粗粒度的防洪；
/// 标识闸门统计每个用户名/邮箱的登录失败次数，用于防暴力破解。
/// 窗口在下一次访问时惰性重置，没有后台定时任务。
/// 每张计数表由一把互斥锁保护，单个键的“检查窗口 + 自增”在同一把锁内完成。
pub struct RateLimiter {
    config: RateLimitConfig,
    ip_counters: Mutex<HashMap<String, IpRequestCounter>>,
    login_attempts: Mutex<HashMap<String, LoginAttemptCounter>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 窗口长度，超过上限的配置按上限处理
fn window_of(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_WINDOW_SECS) as i64)
}

/// 窗口结束时刻，溢出时取可表示的最大时间
fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_add_signed(window)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// 距离窗口重置的秒数，向上取整
fn seconds_until(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = reset_at
        .signed_duration_since(now)
        .num_milliseconds()
        .max(0) as u64;
    (millis + 999) / 1000
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        info!(
            "初始化限流器: IP {} 次/{} 秒, 登录失败 {} 次/{} 秒",
            config.ip_max_requests,
            config.ip_window_secs,
            config.login_max_attempts,
            config.login_window_secs
        );
        Self {
            config,
            ip_counters: Mutex::new(HashMap::new()),
            login_attempts: Mutex::new(HashMap::new()),
        }
    }

    fn ip_window(&self) -> Duration {
        window_of(self.config.ip_window_secs)
    }

    fn login_window(&self) -> Duration {
        window_of(self.config.login_window_secs)
    }

    pub fn check_ip(&self, ip: &str) -> Result<(), RateLimitError> {
        self.check_ip_at(ip, Utc::now())
    }

    /// 与 `check_ip` 相同，但使用调用方给定的当前时间
    pub fn check_ip_at(&self, ip: &str, now: DateTime<Utc>) -> Result<(), RateLimitError> {
        let mut counters = lock(&self.ip_counters);
        let window = self.ip_window();
        let counter = counters
            .entry(ip.to_string())
            .or_insert_with(|| IpRequestCounter {
                count: 0,
                window_reset_at: window_end(now, window),
                warned: false,
            });

        if now >= counter.window_reset_at {
            *counter = IpRequestCounter {
                count: 0,
                window_reset_at: window_end(now, window),
                warned: false,
            };
        }

        counter.count = counter.count.saturating_add(1);
        let max = self.config.ip_max_requests;

        if counter.count > max {
            let retry_after = seconds_until(counter.window_reset_at, now);
            // 同一窗口只警告一次，避免被刷请求时日志放大
            if !counter.warned {
                counter.warned = true;
                warn!(
                    "IP {} 在 {} 秒内请求超过 {} 次，已限流，{} 秒后重试",
                    ip, self.config.ip_window_secs, max, retry_after
                );
            }
            return Err(RateLimitError::TooManyRequests { retry_after });
        }

        debug!("IP {} 请求通过限流检查 ({}/{})", ip, counter.count, max);
        Ok(())
    }

    pub fn check_identifier(&self, identifier: Option<&str>) -> Result<(), RateLimitError> {
        self.check_identifier_at(identifier, Utc::now())
    }

    /// 检查标识是否被锁定；检查本身从不增加计数
    pub fn check_identifier_at(
        &self,
        identifier: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), RateLimitError> {
        let identifier = match identifier {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(()),
        };

        let attempts = lock(&self.login_attempts);
        match attempts.get(identifier) {
            Some(attempt)
                if now < attempt.window_reset_at
                    && attempt.count >= self.config.login_max_attempts =>
            {
                Err(RateLimitError::TooManyAttempts {
                    retry_after: seconds_until(attempt.window_reset_at, now),
                    reset_time: attempt.window_reset_at,
                })
            }
            _ => Ok(()),
        }
    }

    /// 记录一次登录失败，返回当前窗口内的失败次数
    pub fn record_failed_attempt(&self, identifier: &str) -> u32 {
        self.record_failed_attempt_at(identifier, Utc::now())
    }

    pub fn record_failed_attempt_at(&self, identifier: &str, now: DateTime<Utc>) -> u32 {
        let mut attempts = lock(&self.login_attempts);
        let window = self.login_window();
        let attempt = attempts
            .entry(identifier.to_string())
            .or_insert_with(|| LoginAttemptCounter {
                count: 0,
                window_reset_at: window_end(now, window),
            });

        if now >= attempt.window_reset_at {
            *attempt = LoginAttemptCounter {
                count: 0,
                window_reset_at: window_end(now, window),
            };
        }

        attempt.count = attempt.count.saturating_add(1);
        debug!(
            "记录标识 {} 的登录失败，当前失败次数: {}",
            identifier, attempt.count
        );
        attempt.count
    }

    /// 登录成功后删除该标识的失败计数
    pub fn clear_attempts(&self, identifier: &str) {
        if lock(&self.login_attempts).remove(identifier).is_some() {
            debug!("已清除标识 {} 的登录失败记录", identifier);
        }
    }

    /// 当前窗口内的失败次数，窗口已过期视为 0
    pub fn failed_attempts_at(&self, identifier: &str, now: DateTime<Utc>) -> u32 {
        lock(&self.login_attempts)
            .get(identifier)
            .filter(|attempt| now < attempt.window_reset_at)
            .map(|attempt| attempt.count)
            .unwrap_or(0)
    }

    pub fn failed_attempts(&self, identifier: &str) -> u32 {
        self.failed_attempts_at(identifier, Utc::now())
    }
}
