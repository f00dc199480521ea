use image::{GrayImage, Luma, RgbImage, imageops};
use ndarray::{Array4, ArrayView2};

/// U²-Net 输入边长
pub const U2NET_INPUT_SIZE: u32 = 320;

/// ImageNet 归一化参数
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// 将 RGB 图片转换为模型输入张量
///
/// 1. Lanczos3 缩放到 `size × size`
/// 2. 除以缩放后图像的最大通道值（全黑图按 1 处理）
/// 3. 按通道减均值、除标准差
/// 4. HWC → NCHW，形状 `[1, 3, size, size]`
pub fn to_input_tensor(image: &RgbImage, size: u32) -> Array4<f32> {
    let resized = if image.dimensions() == (size, size) {
        image.clone()
    } else {
        imageops::resize(image, size, size, imageops::FilterType::Lanczos3)
    };

    let max = resized
        .as_raw()
        .iter()
        .copied()
        .max()
        .filter(|m| *m > 0)
        .map_or(1.0, f32::from);

    let mut tensor = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let v = f32::from(pixel[c]) / max;
            tensor[[0, c, y as usize, x as usize]] = (v - MEAN[c]) / STD[c];
        }
    }
    tensor
}

/// 将模型原始预测（单通道，任意尺度）转换为目标尺寸的灰度蒙版
///
/// 预测值先做 min-max 归一化到 `[0, 1]`（常量预测视为全背景），
/// 再放大到 0-255 并用 Lanczos3 缩放回原图尺寸。
pub fn prediction_to_mask(pred: ArrayView2<'_, f32>, width: u32, height: u32) -> GrayImage {
    let (rows, cols) = pred.dim();

    let (min, max) = pred
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let range = max - min;

    let mask = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = pred[[y as usize, x as usize]];
        let norm = if range > f32::EPSILON {
            (v - min) / range
        } else {
            0.0
        };
        Luma([(norm * 255.0).clamp(0.0, 255.0) as u8])
    });

    if mask.dimensions() == (width, height) {
        mask
    } else {
        imageops::resize(&mask, width, height, imageops::FilterType::Lanczos3)
    }
}
