/// 健康检查
pub mod health;

/// 图片去背景
pub mod removal;
