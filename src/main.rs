use bg_removal_service::features::removal::{BackgroundRemover, U2NetRemover};
use bg_removal_service::startup::run_startup_checks;
use bg_removal_service::{AppConfig, AppState, ShutdownManager, build_router};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bg_removal_service=info,tower_http=info".into()),
        )
        .init();

    // 创建优雅退出管理器
    let shutdown_manager = ShutdownManager::new();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    // 启动信号处理器
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    // 确保模型文件可用（缺失时按配置下载）
    let model_path = match run_startup_checks(config).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Startup checks failed: {}", e);
            std::process::exit(1);
        }
    };

    // 加载 ONNX 会话（阻塞操作）
    let intra_threads = config.model.intra_threads;
    let remover: Arc<dyn BackgroundRemover> = match tokio::task::spawn_blocking(move || {
        U2NetRemover::load(&model_path, intra_threads)
    })
    .await
    {
        Ok(Ok(r)) => Arc::new(r) as Arc<dyn BackgroundRemover>,
        Ok(Err(e)) => {
            tracing::error!("Model load failed: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Model load task failed: {}", e);
            std::process::exit(1);
        }
    };

    let max_parallel = config.removal.effective_parallelism();
    let app_state = AppState::new(remover, max_parallel);
    let app = build_router(app_state, config);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Endpoint: POST http://{}/remove-bg", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Max parallel inferences: {}", max_parallel);

    // 收到退出信号后停止接收新连接，并在超时时间内等待进行中的请求完成
    let shutdown_timeout = config.shutdown.timeout_duration();
    let manager_for_signal = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = manager_for_signal.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    let server = tokio::spawn(async move { graceful.await });

    let result = tokio::select! {
        joined = server => joined,
        _ = async {
            shutdown_manager.wait_for_shutdown().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("优雅退出超时（{}秒），强制退出", shutdown_timeout.as_secs());
            std::process::exit(1);
        }
    };

    match result {
        Ok(Ok(())) => tracing::info!("服务器已优雅关闭"),
        Ok(Err(e)) => {
            tracing::error!("服务器运行错误: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("服务器任务异常退出: {}", e);
            std::process::exit(1);
        }
    }
}
