use once_cell::sync::OnceCell;
use reqwest::Client;
use std::time::Duration;

/// 模型下载专用 HTTP Client（全局复用）。
///
/// 仅设置连接超时：模型文件体积较大（百 MB 级），总超时交由调用方按需控制。
static CLIENT_DOWNLOAD: OnceCell<Client> = OnceCell::new();

pub fn client_download() -> Result<&'static Client, reqwest::Error> {
    CLIENT_DOWNLOAD.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
    })
}
