use log::LevelFilter;
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET 未配置，无法签发 token")]
    MissingSecret,

    #[error("配置项 {key} 的值无效: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 限流窗口上限：一年
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 3600;
/// 窗口内请求数 / 失败次数的上限
pub const MAX_LIMIT: u32 = 1_000_000;
/// token 有效期上限：十年
pub const MAX_TOKEN_TTL_HOURS: i64 = 10 * 365 * 24;

/// 两道限流闸门的阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub ip_window_secs: u64,
    pub ip_max_requests: u32,
    pub login_window_secs: u64,
    pub login_max_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ip_window_secs: 60,
            ip_max_requests: 20,
            login_window_secs: 300,
            login_max_attempts: 5,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub rate_limit: RateLimitConfig,
    pub bcrypt_cost: u32,
    pub cors_origin: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
    // 非生产环境下内部错误会附带调用栈
    pub diagnostics: bool,
}

impl Config {
    /// 从进程环境变量读取配置（调用前应先执行 dotenv）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            ip_window_secs: parse_in_range(
                &lookup,
                "IP_RATE_WINDOW_SECS",
                defaults.ip_window_secs,
                1..=MAX_WINDOW_SECS,
            )?,
            ip_max_requests: parse_in_range(
                &lookup,
                "IP_RATE_MAX_REQUESTS",
                defaults.ip_max_requests,
                1..=MAX_LIMIT,
            )?,
            login_window_secs: parse_in_range(
                &lookup,
                "LOGIN_WINDOW_SECS",
                defaults.login_window_secs,
                1..=MAX_WINDOW_SECS,
            )?,
            login_max_attempts: parse_in_range(
                &lookup,
                "LOGIN_MAX_ATTEMPTS",
                defaults.login_max_attempts,
                1..=MAX_LIMIT,
            )?,
        };

        let token_ttl_hours =
            parse_in_range(&lookup, "JWT_EXPIRES_IN_HOURS", 24, 1..=MAX_TOKEN_TTL_HOURS)?;

        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            jwt_secret,
            token_ttl_hours,
            rate_limit,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cors_origin: lookup("CORS_ORIGIN").filter(|s| !s.is_empty()),
            log_file: lookup("LOG_FILE").filter(|s| !s.is_empty()).map(PathBuf::from),
            log_level: parse_or(&lookup, "LOG_LEVEL", LevelFilter::Info)?,
            diagnostics: !app_env.eq_ignore_ascii_case("production"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_in_range<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + ToString,
{
    let value = parse_or(lookup, key, default)?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
