use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use ndarray::{ArrayView2, ArrayViewD, Ix4, s};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use std::path::Path;

use super::preprocess::{self, U2NET_INPUT_SIZE};
use crate::error::RemovalError;

/// 前景分割模型抽象
///
/// 处理链路只依赖该 trait，便于替换模型（U²-Net / IS-Net 等）或在测试中注入假实现。
pub trait BackgroundRemover: Send + Sync {
    /// 预测前景蒙版：尺寸与输入一致，0 = 背景，255 = 前景
    fn predict_mask(&self, image: &RgbImage) -> Result<GrayImage, RemovalError>;

    /// 去除背景：以蒙版作为 alpha 通道，颜色通道保持不变
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
        let mask = self.predict_mask(&image.to_rgb8())?;
        apply_mask(image.to_rgba8(), &mask)
    }
}

/// 将蒙版写入 alpha 通道（与原 alpha 相乘，原本透明的像素保持透明）
pub fn apply_mask(mut image: RgbaImage, mask: &GrayImage) -> Result<RgbaImage, RemovalError> {
    if image.dimensions() != mask.dimensions() {
        return Err(RemovalError::Segmentation(format!(
            "mask size {:?} does not match image size {:?}",
            mask.dimensions(),
            image.dimensions()
        )));
    }
    for (pixel, m) in image.pixels_mut().zip(mask.pixels()) {
        pixel[3] = ((u16::from(pixel[3]) * u16::from(m[0])) / 255) as u8;
    }
    Ok(image)
}

/// 从 `[N, C, H, W]` 输出中取第一张图的第一个通道
fn saliency_plane(pred: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>, RemovalError> {
    let shape = pred.shape().to_vec();
    pred.into_dimensionality::<Ix4>()
        .ok()
        .filter(|p| p.shape()[0] > 0 && p.shape()[1] > 0)
        .map(|p| p.slice_move(s![0, 0, .., ..]))
        .ok_or_else(|| {
            RemovalError::Segmentation(format!("unexpected model output shape {shape:?}"))
        })
}

/// U²-Net 显著性分割（ONNX Runtime）
pub struct U2NetRemover {
    session: Session,
    input_size: u32,
}

impl U2NetRemover {
    /// 从 ONNX 文件加载模型
    ///
    /// `intra_threads = 0` 时使用 ONNX Runtime 默认线程数。
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self, RemovalError> {
        tracing::info!("Loading U2-Net model from {}", path.display());

        let mut builder =
            Session::builder()?.with_optimization_level(GraphOptimizationLevel::Level3)?;
        if intra_threads > 0 {
            builder = builder.with_intra_threads(intra_threads)?;
        }
        let session = builder.commit_from_file(path)?;

        tracing::info!("U2-Net model loaded");
        Ok(Self {
            session,
            input_size: U2NET_INPUT_SIZE,
        })
    }
}

impl BackgroundRemover for U2NetRemover {
    fn predict_mask(&self, image: &RgbImage) -> Result<GrayImage, RemovalError> {
        let _span = tracing::debug_span!("u2net_predict").entered();

        let input = preprocess::to_input_tensor(image, self.input_size);
        let outputs = self.session.run(ort::inputs![input.view()]?)?;

        // 第一个输出 d0 为融合后的最终预测
        let pred = outputs[0].try_extract_tensor::<f32>()?;
        let pred = saliency_plane(pred)?;

        let (width, height) = image.dimensions();
        Ok(preprocess::prediction_to_mask(pred, width, height))
    }
}
