/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// CORS 中间件构建
pub mod cors;

/// request_id 中间件
pub mod request_id;

/// 启动检查模块（模型文件准备）
pub mod startup;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 优雅退出管理模块
pub mod shutdown;

/// HTTP Client 复用工具
pub mod http;

/// OpenAPI 文档
pub mod openapi;

use axum::{Router, extract::DefaultBodyLimit};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::{AppError, RemovalError};
pub use shutdown::{ShutdownManager, ShutdownReason};
pub use state::AppState;

/// 构建完整路由表（启动时调用一次）
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let body_limit = match config.server.max_body_bytes {
        0 => DefaultBodyLimit::disable(),
        n => DefaultBodyLimit::max(usize::try_from(n).unwrap_or(usize::MAX)),
    };

    let mut app = Router::<AppState>::new()
        .merge(features::health::create_health_router())
        .merge(features::removal::create_removal_router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(body_limit)
        .with_state(state);

    if let Some(cors) = cors::build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(axum::middleware::from_fn(request_id::request_id_middleware))
}
