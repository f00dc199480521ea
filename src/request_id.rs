use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// 请求 ID 头
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// 客户端传入 ID 的最大长度
const MAX_CLIENT_ID_LEN: usize = 128;

/// 单次请求的关联 ID，同时写入请求扩展、任务上下文与日志 span。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// 服务端生成：`req_` + 无连字符 UUID
    pub fn generate() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }

    /// 接受客户端传入的 ID；仅允许字母数字与 `-` `_` `.`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let safe = raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
        (!raw.is_empty() && raw.len() <= MAX_CLIENT_ID_LEN && safe).then(|| Self(raw.to_owned()))
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

tokio::task_local! {
    static CURRENT: RequestId;
}

/// 当前请求的 ID（仅在中间件包裹的任务内可用）
pub fn current_request_id() -> Option<String> {
    CURRENT.try_with(|id| id.0.clone()).ok()
}

/// 请求 ID 中间件：透传合法的 `X-Request-Id`，否则生成新 ID，并回写到响应头。
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let span = tracing::info_span!(
        "request",
        request_id = id.as_str(),
        method = %req.method(),
        path = req.uri().path()
    );
    req.extensions_mut().insert(id.clone());

    let header = HeaderValue::from_str(id.as_str()).ok();
    let mut res = CURRENT.scope(id, next.run(req)).instrument(span).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
