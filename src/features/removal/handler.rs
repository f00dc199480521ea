use axum::body::Bytes;
use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::post,
};
use std::time::{Duration, Instant};

use super::service;
use super::types::{UPLOAD_FIELD_PREFERENCE, Upload};
use crate::error::AppError;
use crate::state::AppState;

/// 读取 multipart，按字段优先级挑选上传图片。
///
/// 只有带 `filename` 的文件部分才算上传，同名的普通文本字段被忽略。
/// 同名字段重复出现时取第一个；一旦读到最高优先级字段即停止读取。
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, AppError> {
    let mut found: [Option<Upload>; UPLOAD_FIELD_PREFERENCE.len()] = Default::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ProcessingFailure(e.body_text()))?
    {
        let Some(rank) = field
            .name()
            .and_then(|name| UPLOAD_FIELD_PREFERENCE.iter().position(|p| *p == name))
        else {
            continue;
        };
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if found[rank].is_some() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::ProcessingFailure(e.body_text()))?;
        found[rank] = Some(Upload {
            field: UPLOAD_FIELD_PREFERENCE[rank],
            file_name,
            data,
        });

        if rank == 0 {
            break;
        }
    }

    Ok(found.into_iter().flatten().next())
}

#[utoipa::path(
    post,
    path = "/remove-bg",
    summary = "去除图片背景",
    description = "上传图片（字段 `image`，缺失时回退 `image_file`），返回背景透明的 PNG。解码、分割、编码中的任何失败统一返回 500。",
    request_body(content = super::types::RemoveBgForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PNG bytes of the processed image"),
        (status = 400, description = "No image file provided", body = crate::error::ErrorBody),
        (status = 500, description = "Processing failure", body = crate::error::ErrorBody)
    ),
    tag = "Removal"
)]
pub async fn remove_bg(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let result = remove_bg_inner(state, multipart).await;
    if let Err(e @ (AppError::ProcessingFailure(_) | AppError::Internal(_))) = &result {
        tracing::error!(
            request_id = crate::request_id::current_request_id().as_deref().unwrap_or("-"),
            "Error: {}",
            e
        );
    }
    result
}

async fn remove_bg_inner(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let t_total = Instant::now();

    // 非 multipart 请求等同于没有上传字段
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            tracing::debug!("multipart 解析被拒绝: {}", rejection.body_text());
            return Err(AppError::no_image_provided());
        }
    };

    let Some(upload) = read_upload(multipart).await? else {
        return Err(AppError::no_image_provided());
    };
    tracing::info!(
        field = upload.field,
        file_name = %upload.file_name,
        bytes = upload.data.len(),
        "收到去背景请求"
    );

    let sem = state.removal_semaphore.clone();
    let t_wait = Instant::now();
    let _permit = sem
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(format!("获取推理信号量失败: {e}")))?;
    let wait = t_wait.elapsed();

    // 解码 / 推理 / 编码均为 CPU 密集操作，必须移出 tokio worker。
    let remover = state.remover.clone();
    let processed = tokio::task::spawn_blocking(move || {
        service::process_upload(remover.as_ref(), &upload.data)
    })
    .await
    .map_err(|e| AppError::Internal(format!("阻塞去背景任务执行失败: {e}")))??;

    tracing::info!(
        width = processed.width,
        height = processed.height,
        png_bytes = processed.png.len(),
        wait_ms = millis(wait),
        decode_ms = millis(processed.decode_time),
        segment_ms = millis(processed.segment_time),
        encode_ms = millis(processed.encode_time),
        total_ms = millis(t_total.elapsed()),
        "去背景完成"
    );

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/png"))],
        Bytes::from(processed.png),
    )
        .into_response())
}

/// 耗时转毫秒，超出 u64 时饱和
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

pub fn create_removal_router() -> Router<AppState> {
    Router::new().route("/remove-bg", post(remove_bg))
}

#[cfg(test)]
mod tests {
    use super::millis;
    use std::time::Duration;

    #[test]
    fn millis_converts_and_saturates() {
        assert_eq!(millis(Duration::from_micros(2_500)), 2);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
