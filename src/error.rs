use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 缺少上传字段时返回给调用方的固定文案
pub const NO_IMAGE_PROVIDED: &str = "No image file provided";

/// 应用统一错误类型
///
/// 对外只区分两类：请求不合法（400）与处理失败（500）。
/// 解码失败、模型失败、编码失败不再细分，原始错误描述直接透传到响应体。
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 请求不合法（如缺少图片字段）
    #[error("{0}")]
    InvalidRequest(String),

    /// 解码 / 分割 / 编码过程中的任意失败
    #[error("{0}")]
    ProcessingFailure(String),

    /// 内部错误（启动期资源准备、阻塞任务异常等）
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 去背景流水线内部错误
#[derive(Error, Debug)]
pub enum RemovalError {
    /// 上传内容无法解码为图片
    #[error("{0}")]
    Decode(String),

    /// 分割模型推理失败
    #[error("{0}")]
    Segmentation(String),

    /// PNG 编码失败
    #[error("{0}")]
    Encode(String),
}

/// 错误响应体：`{"error": "<message>"}`
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// 错误描述（原样透传底层错误信息）
    #[schema(example = "No image file provided")]
    pub error: String,
}

impl AppError {
    pub fn no_image_provided() -> Self {
        AppError::InvalidRequest(NO_IMAGE_PROVIDED.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ProcessingFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RemovalError> for AppError {
    fn from(err: RemovalError) -> Self {
        AppError::ProcessingFailure(err.to_string())
    }
}

impl From<ort::Error> for RemovalError {
    fn from(err: ort::Error) -> Self {
        RemovalError::Segmentation(err.to_string())
    }
}
