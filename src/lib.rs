pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logger;
pub mod rate_limit;
pub mod store;

use std::sync::Arc;

use log::info;

use auth::{LoginService, TokenIssuer};
use config::{Config, ConfigError, MAX_TOKEN_TTL_HOURS};
use rate_limit::RateLimiter;
use store::UserStore;

// 应用状态
pub struct AppState {
    pub rate_limiter: Arc<RateLimiter>,
    pub tokens: Arc<TokenIssuer>,
    pub login_service: LoginService,
}

impl AppState {
    /// 组装登录流程所需的全部组件，签名密钥缺失时直接失败
    pub fn new(config: Config, store: Arc<dyn UserStore>) -> Result<Self, ConfigError> {
        let tokens = Arc::new(TokenIssuer::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
        )?);
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
        let login_service = LoginService::new(
            store,
            rate_limiter.clone(),
            tokens.clone(),
            config.diagnostics,
        );

        info!("应用状态初始化完成");
        Ok(Self {
            rate_limiter,
            tokens,
            login_service,
        })
    }
}
