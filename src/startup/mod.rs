/// 分割模型文件准备（本地校验 / 按需下载）
pub mod model_loader;

use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::AppError;

/// 执行启动检查，返回可直接加载的模型路径
pub async fn run_startup_checks(config: &AppConfig) -> Result<PathBuf, AppError> {
    tracing::info!("🔍 开始执行启动检查...");
    let model_path = model_loader::ensure_model_file(&config.model).await?;
    tracing::info!("✅ 启动检查完成");
    Ok(model_path)
}
