use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::sync::Arc;

use login_api::config::Config;
use login_api::store::InMemoryUserStore;
use login_api::{api, logger, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 加载 .env
    dotenv().ok();

    // 签名密钥缺失属于配置错误，直接退出
    let config = Config::from_env().map_err(|e| {
        eprintln!("配置错误: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // 初始化日志系统
    if let Err(e) = logger::init(&config) {
        eprintln!("初始化日志系统失败: {}", e);
    }

    info!("应用程序启动");

    let store = InMemoryUserStore::seeded(config.bcrypt_cost).map_err(|e| {
        error!("{}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    let bind_addr = (config.host.clone(), config.port);
    let cors_origin = config.cors_origin.clone();

    let app_state = web::Data::new(
        AppState::new(config, Arc::new(store))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?,
    );

    info!("服务器启动在 http://{}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        }
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

        let state = app_state.clone();
        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .configure(move |cfg| api::configure(cfg, &state))
    })
    .bind(bind_addr)?
    .run()
    .await
}
