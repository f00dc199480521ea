use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::removal::handler::remove_bg,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::features::health::handler::HealthResponse,
        crate::features::removal::RemoveBgForm,
    )),
    tags(
        (name = "Removal", description = "图片去背景：上传图片，返回背景透明的 PNG。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Background Removal Service API",
        version = env!("CARGO_PKG_VERSION"),
        description = "基于预训练分割模型（U²-Net / ONNX Runtime）的图片去背景服务。"
    )
)]
pub struct ApiDoc;
