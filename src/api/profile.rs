use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::{Claims, PublicUser};

// 需要经过 JwtAuth，claims 由中间件放入请求扩展
pub async fn me(claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": PublicUser::from(&*claims)
    }))
}
