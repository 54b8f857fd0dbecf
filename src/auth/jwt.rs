use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error, info};
use thiserror::Error;

use super::types::{Claims, PublicUser};
use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("{0}")]
    Encode(String),
}

/// 使用服务端密钥签发和校验 HS256 token，不在服务端保存任何状态
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &PublicUser, now: DateTime<Utc>) -> Result<String, TokenError> {
        debug!("为用户 {} 生成 JWT token", user.id);
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            error!("用户 {} 的 token 过期时间超出范围", user.id);
            TokenError::Encode("token expiry out of range".to_string())
        })?;
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        match encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key) {
            Ok(token) => {
                info!("成功为用户 {} 生成 token", user.id);
                Ok(token)
            }
            Err(e) => {
                error!("为用户 {} 生成 token 失败: {}", user.id, e);
                Err(TokenError::Encode(e.to_string()))
            }
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        debug!("验证 JWT token");
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
