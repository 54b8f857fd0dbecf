use actix_web::{web, HttpResponse};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::auth::PublicUser;
use crate::error::ApiError;
use crate::AppState;

// 不实现 Debug，避免密码被打印
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: PublicUser,
    pub token: String,
}

pub async fn login(
    body: web::Json<LoginRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    debug!("处理登录请求");
    let body = body.into_inner();
    let identifier = body.identifier.as_deref().unwrap_or("");
    let password = body.password.as_deref().unwrap_or("");

    let outcome = data.login_service.login(identifier, password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful",
        user: outcome.user,
        token: outcome.token,
    }))
}
