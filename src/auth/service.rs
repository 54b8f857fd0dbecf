use log::{error, info, warn};
use std::backtrace::Backtrace;
use std::fmt::Display;
use std::sync::Arc;

use super::password::verify_password;
use super::types::PublicUser;
use super::validator::{validate_identifier, validate_password};
use super::TokenIssuer;
use crate::error::ApiError;
use crate::rate_limit::RateLimiter;
use crate::store::UserStore;

#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub user: PublicUser,
    pub token: String,
}

/// 登录流程：校验输入 → 标识锁定检查 → 查找用户 → 比对密码 → 签发 token
pub struct LoginService {
    store: Arc<dyn UserStore>,
    limiter: Arc<RateLimiter>,
    tokens: Arc<TokenIssuer>,
    diagnostics: bool,
}

impl LoginService {
    pub fn new(
        store: Arc<dyn UserStore>,
        limiter: Arc<RateLimiter>,
        tokens: Arc<TokenIssuer>,
        diagnostics: bool,
    ) -> Self {
        Self {
            store,
            limiter,
            tokens,
            diagnostics,
        }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginSuccess, ApiError> {
        // 输入不合法时不触碰任何限流计数
        let validated = validate_identifier(identifier)
            .and_then(|id| validate_password(password).map(|pw| (id, pw)));
        let (identifier, password) = match validated {
            Ok(pair) => pair,
            Err(e) => {
                warn!("登录请求参数无效: {}", e);
                return Err(e.into());
            }
        };

        if let Err(e) = self.limiter.check_identifier(Some(identifier)) {
            warn!(
                "标识 {} 登录失败次数过多，已锁定 {} 秒",
                identifier,
                e.retry_after()
            );
            return Err(e.into());
        }

        let user = match self.store.find_by_identifier(identifier).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                let failures = self.limiter.record_failed_attempt(identifier);
                warn!("登录失败: 标识 {} 不存在 (失败次数 {})", identifier, failures);
                return Err(ApiError::InvalidCredentials);
            }
            Err(e) => return Err(self.internal("查询用户失败", e)),
        };

        let candidate = password.to_string();
        let password_hash = user.password_hash.clone();
        let matched = tokio::task::spawn_blocking(move || verify_password(&candidate, &password_hash))
            .await
            .map_err(|e| self.internal("密码校验任务异常", e))?
            .map_err(|e| self.internal("密码校验失败", e))?;

        if !matched {
            let failures = self.limiter.record_failed_attempt(identifier);
            warn!(
                "登录失败: 用户 {} 密码错误 (失败次数 {})",
                user.username, failures
            );
            return Err(ApiError::InvalidCredentials);
        }

        self.limiter.clear_attempts(identifier);

        let public = PublicUser::from(&user);
        let token = self
            .tokens
            .issue(&public)
            .map_err(|e| self.internal("签发 token 失败", e))?;

        info!("用户 {} 登录成功", public.username);
        Ok(LoginSuccess {
            user: public,
            token,
        })
    }

    fn internal(&self, context: &str, err: impl Display) -> ApiError {
        if self.diagnostics {
            error!("{}: {}\n{}", context, err, Backtrace::force_capture());
        } else {
            error!("{}: {}", context, err);
        }
        ApiError::Internal(format!("{}: {}", context, err))
    }
}
