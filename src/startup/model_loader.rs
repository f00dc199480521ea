use crate::config::ModelConfig;
use crate::error::AppError;
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// 确保分割模型文件可用
///
/// 1. 本地已存在：按需校验 SHA-256 后直接返回
/// 2. 本地缺失且配置了下载地址：下载到 `<path>.part`，校验后原子重命名
/// 3. 否则返回错误
pub async fn ensure_model_file(model: &ModelConfig) -> Result<PathBuf, AppError> {
    let path = PathBuf::from(&model.path);
    let expected = model.expected_sha256();

    if path.exists() {
        tracing::info!("✅ 模型文件已存在: {:?}", path);
        if let Some(expected) = expected.as_deref() {
            let actual = sha256_of_file(&path).await?;
            if actual != expected {
                return Err(AppError::Internal(format!(
                    "模型文件校验失败: {path:?} 期望 {expected}，实际 {actual}"
                )));
            }
            tracing::info!("✅ 模型文件 SHA-256 校验通过");
        }
        return Ok(path);
    }

    let Some(url) = model.download_url() else {
        return Err(AppError::Internal(format!(
            "模型文件不存在且未配置下载地址: {path:?}"
        )));
    };

    tracing::info!("📦 模型文件缺失，开始下载");
    tracing::info!("📍 下载地址: {}", url);
    tracing::info!("📂 目标路径: {:?}", path);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(format!("创建模型目录失败: {e}")))?;
    }

    let part_path = part_path_for(&path);
    let actual = match download_to(url, &part_path).await {
        Ok(digest) => digest,
        Err(e) => {
            let _ = fs::remove_file(&part_path).await;
            return Err(e);
        }
    };

    if let Some(expected) = expected.as_deref()
        && actual != expected
    {
        let _ = fs::remove_file(&part_path).await;
        return Err(AppError::Internal(format!(
            "下载的模型文件校验失败: 期望 {expected}，实际 {actual}"
        )));
    }

    fs::rename(&part_path, &path)
        .await
        .map_err(|e| AppError::Internal(format!("保存模型文件失败: {e}")))?;

    tracing::info!("✅ 模型下载完成 (sha256={})", actual);
    Ok(path)
}

fn part_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// 流式下载到指定路径，返回内容的 SHA-256（小写 hex）
async fn download_to(url: &str, dest: &Path) -> Result<String, AppError> {
    let client = crate::http::client_download()
        .map_err(|e| AppError::Internal(format!("创建 HTTP Client 失败: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::Internal(format!("下载模型失败: {e}")))?;

    let total = resp.content_length();
    let mut file = fs::File::create(dest)
        .await
        .map_err(|e| AppError::Internal(format!("创建临时文件失败: {e}")))?;

    let mut hasher = Sha256::new();
    let mut received: u64 = 0;
    let mut last_progress = 0;
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::Internal(format!("下载模型失败: {e}")))?;
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("写入模型文件失败: {e}")))?;
        received += chunk.len() as u64;

        // 每 10% 打印一次进度
        if let Some(total) = total.filter(|t| *t > 0) {
            let percentage = (received as f64 / total as f64 * 100.0) as u32;
            if percentage >= last_progress + 10 {
                tracing::info!("⏬ 下载进度: {}% ({}/{})", percentage, received, total);
                last_progress = percentage;
            }
        }
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("写入模型文件失败: {e}")))?;

    Ok(hex::encode(hasher.finalize()))
}

async fn sha256_of_file(path: &Path) -> Result<String, AppError> {
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| AppError::Internal(format!("读取模型文件失败: {e}")))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| AppError::Internal(format!("读取模型文件失败: {e}")))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
