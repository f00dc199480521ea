use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{Router, routing::get};
use sha2::{Digest, Sha256};

use bg_removal_service::config::ModelConfig;
use bg_removal_service::startup::model_loader::ensure_model_file;

const PAYLOAD: &[u8] = b"fake onnx weights for download tests";

/// 启动一个只提供 `/u2net.onnx` 的本地 HTTP 服务
async fn start_model_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind tcp listener");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().route("/u2net.onnx", get(|| async { PAYLOAD }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn scratch_model_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("bg-removal-test-{}", uuid::Uuid::new_v4().simple()))
        .join("u2net.onnx")
}

fn part_of(path: &std::path::Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".part");
    PathBuf::from(s)
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[tokio::test]
async fn existing_file_is_used_without_download() {
    let path = scratch_model_path();
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, PAYLOAD).expect("write model");

    let model = ModelConfig {
        path: path.to_string_lossy().into_owned(),
        download_url: None,
        sha256: Some(sha256_hex(PAYLOAD)),
        ..ModelConfig::default()
    };
    let resolved = ensure_model_file(&model).await.expect("model available");
    assert_eq!(resolved, path);
}

#[tokio::test]
async fn existing_file_with_wrong_checksum_is_rejected() {
    let path = scratch_model_path();
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, b"tampered").expect("write model");

    let model = ModelConfig {
        path: path.to_string_lossy().into_owned(),
        download_url: None,
        sha256: Some(sha256_hex(PAYLOAD)),
        ..ModelConfig::default()
    };
    assert!(ensure_model_file(&model).await.is_err());
}

#[tokio::test]
async fn missing_file_without_url_fails() {
    let model = ModelConfig {
        path: scratch_model_path().to_string_lossy().into_owned(),
        download_url: None,
        ..ModelConfig::default()
    };
    assert!(ensure_model_file(&model).await.is_err());
}

#[tokio::test]
async fn missing_file_is_downloaded_and_verified() {
    let addr = start_model_server().await;
    let path = scratch_model_path();

    let model = ModelConfig {
        path: path.to_string_lossy().into_owned(),
        download_url: Some(format!("http://{addr}/u2net.onnx")),
        sha256: Some(sha256_hex(PAYLOAD).to_uppercase()),
        ..ModelConfig::default()
    };
    let resolved = ensure_model_file(&model).await.expect("download model");

    assert_eq!(resolved, path);
    assert_eq!(std::fs::read(&path).expect("read model"), PAYLOAD);
    assert!(!part_of(&path).exists());
}

#[tokio::test]
async fn checksum_mismatch_leaves_no_files_behind() {
    let addr = start_model_server().await;
    let path = scratch_model_path();

    let model = ModelConfig {
        path: path.to_string_lossy().into_owned(),
        download_url: Some(format!("http://{addr}/u2net.onnx")),
        sha256: Some(sha256_hex(b"something else")),
        ..ModelConfig::default()
    };
    assert!(ensure_model_file(&model).await.is_err());
    assert!(!path.exists());
    assert!(!part_of(&path).exists());
}

#[tokio::test]
async fn http_error_status_fails_download() {
    let addr = start_model_server().await;
    let path = scratch_model_path();

    let model = ModelConfig {
        path: path.to_string_lossy().into_owned(),
        download_url: Some(format!("http://{addr}/missing.onnx")),
        ..ModelConfig::default()
    };
    assert!(ensure_model_file(&model).await.is_err());
    assert!(!path.exists());
}
