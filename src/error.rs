use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use chrono::SecondsFormat;
use serde::Serialize;
use thiserror::Error;

use crate::auth::{TokenError, ValidationError};
use crate::rate_limit::RateLimitError;
use crate::store::StoreError;

/// 未知用户与密码错误共用的提示，不能区分两者
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    #[error("Access token required")]
    MissingToken,

    #[error(transparent)]
    Token(TokenError),

    // 细节只记录在服务端日志中
    #[error("内部错误: {0}")]
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_time: Option<String>,
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadInput(e.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Encode(msg) => ApiError::Internal(format!("签发 token 失败: {}", msg)),
            other => ApiError::Token(other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::MissingToken | ApiError::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Internal(_) => INTERNAL_SERVER_ERROR.to_string(),
            other => other.to_string(),
        };

        let (retry_after, reset_time) = match self {
            ApiError::RateLimited(RateLimitError::TooManyRequests { retry_after }) => {
                (Some(*retry_after), None)
            }
            ApiError::RateLimited(RateLimitError::TooManyAttempts {
                retry_after,
                reset_time,
            }) => (
                Some(*retry_after),
                Some(reset_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            _ => (None, None),
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(secs) = retry_after {
            builder.insert_header((header::RETRY_AFTER, secs.to_string()));
        }
        builder.json(ErrorBody {
            success: false,
            error: &message,
            retry_after,
            reset_time,
        })
    }
}
