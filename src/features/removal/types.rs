use axum::body::Bytes;
use serde::Deserialize;
use utoipa::ToSchema;

/// 上传字段优先级：先 `image`，缺失时回退 `image_file`
pub const UPLOAD_FIELD_PREFERENCE: [&str; 2] = ["image", "image_file"];

/// 从 multipart 中选出的待处理图片
#[derive(Debug, Clone)]
pub struct Upload {
    /// 命中的字段名
    pub field: &'static str,
    /// 客户端提供的文件名（仅用于日志）
    pub file_name: String,
    pub data: Bytes,
}

/// `POST /remove-bg` 的表单结构（仅用于 OpenAPI 文档）
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveBgForm {
    /// 待处理图片
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    /// 备用字段名，`image` 缺失时生效
    #[schema(value_type = Option<String>, format = Binary)]
    pub image_file: Option<Vec<u8>>,
}
