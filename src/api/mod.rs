use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use log::debug;
use serde_json::json;

use crate::auth::JwtAuth;
use crate::error::ApiError;
use crate::rate_limit::IpRateLimit;
use crate::AppState;

mod login;
mod profile;

pub use login::{LoginRequest, LoginResponse};

/// 注册所有 API 路由；IP 限流只挂在登录接口上
pub fn configure(cfg: &mut web::ServiceConfig, state: &web::Data<AppState>) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::resource("/api/login")
                .wrap(IpRateLimit::new(state.rate_limiter.clone()))
                .route(web::post().to(login::login)),
        )
        .service(
            web::resource("/api/me")
                .wrap(JwtAuth::new(state.tokens.clone()))
                .route(web::get().to(profile::me)),
        )
        .route("/api/health", web::get().to(health));
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("请求体解析失败: {}", err);
    ApiError::BadInput("Invalid request body".to_string()).into()
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "status": "ok"
    }))
}
