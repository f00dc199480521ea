use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::features::removal::BackgroundRemover;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 前景分割模型（启动时加载一次，只读共享）
    pub remover: Arc<dyn BackgroundRemover>,
    /// 控制并发推理的信号量（限制 CPU 密集型任务数量）
    pub removal_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(remover: Arc<dyn BackgroundRemover>, max_parallel: usize) -> Self {
        Self {
            remover,
            removal_semaphore: Arc::new(Semaphore::new(max_parallel.max(1))),
        }
    }
}
