use std::time::{Duration, Instant};

use super::codec;
use super::segmentation::BackgroundRemover;
use crate::error::RemovalError;

/// 处理结果：PNG 字节与各阶段耗时
#[derive(Debug)]
pub struct ProcessedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub decode_time: Duration,
    pub segment_time: Duration,
    pub encode_time: Duration,
}

/// 解码 → 去背景 → PNG 编码（CPU 密集，调用方需放到阻塞线程池执行）
pub fn process_upload(
    remover: &dyn BackgroundRemover,
    bytes: &[u8],
) -> Result<ProcessedImage, RemovalError> {
    let t = Instant::now();
    let image = codec::decode_image(bytes)?;
    let decode_time = t.elapsed();

    let t = Instant::now();
    let output = remover.remove_background(&image)?;
    let segment_time = t.elapsed();

    let t = Instant::now();
    let png = codec::encode_png(&output)?;
    let encode_time = t.elapsed();

    Ok(ProcessedImage {
        png,
        width: output.width(),
        height: output.height(),
        decode_time,
        segment_time,
        encode_time,
    })
}
