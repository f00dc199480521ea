use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::error::RemovalError;

/// 从内存字节解码图片（格式由内容自动识别）
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, RemovalError> {
    image::load_from_memory(bytes).map_err(|e| RemovalError::Decode(e.to_string()))
}

/// 无损编码为 PNG 字节
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RemovalError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| RemovalError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}
