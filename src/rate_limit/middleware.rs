use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use super::RateLimiter;
use crate::error::ApiError;

/// 无法得知客户端地址时使用的占位值
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 按客户端 IP 限流的中间件，挂在登录路由上
#[derive(Clone)]
pub struct IpRateLimit {
    limiter: Arc<RateLimiter>,
}

impl IpRateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IpRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = IpRateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IpRateLimitService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct IpRateLimitService<S> {
    service: S,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for IpRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = client_ip(&req);

        if let Err(e) = self.limiter.check_ip(&ip) {
            let response = ApiError::from(e).error_response();
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// 解析客户端 IP：优先取 X-Forwarded-For 的第一项（假定前面是可信代理），
/// 其次是套接字地址，都没有时返回 `UNKNOWN_CLIENT`
pub fn client_ip(req: &ServiceRequest) -> String {
    forwarded_for(req.headers())
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .next()
        .filter(|first| !first.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::net::SocketAddr;

    fn peer() -> SocketAddr {
        "192.0.2.10:54321".parse().unwrap()
    }

    #[test]
    fn test_prefers_first_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1"))
            .peer_addr(peer())
            .to_srv_request();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_peer_addr() {
        let req = TestRequest::default().peer_addr(peer()).to_srv_request();
        assert_eq!(client_ip(&req), "192.0.2.10");

        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", ""))
            .peer_addr(peer())
            .to_srv_request();
        assert_eq!(client_ip(&req), "192.0.2.10");
    }

    #[test]
    fn test_unknown_without_any_address() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(client_ip(&req), UNKNOWN_CLIENT);
    }
}
