//! CLIP画像前処理
//!
//! 短辺を入力サイズへリサイズ → 中央切り出し → [0,1]化 → チャンネル毎に正規化（NCHW）

use anyhow::{bail, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tract_onnx::prelude::tract_ndarray::Array4;

pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// 短辺を `size` に合わせて縮尺し、中央 `size`×`size` を切り出す
pub fn resize_and_crop(image: &RgbImage, size: u32) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        bail!("image has no pixels ({}x{})", width, height);
    }

    let scale = size as f64 / width.min(height) as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(size);
    let new_height = ((height as f64 * scale).round() as u32).max(size);

    let resized = imageops::resize(image, new_width, new_height, FilterType::CatmullRom);
    let x = (new_width - size) / 2;
    let y = (new_height - size) / 2;

    Ok(imageops::crop_imm(&resized, x, y, size, size).to_image())
}

/// モデル入力テンソル [1, 3, size, size]
pub fn preprocess(image: &RgbImage, size: u32) -> Result<Array4<f32>> {
    let cropped = resize_and_crop(image, size)?;
    let size = size as usize;

    Ok(Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        let value = cropped.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        (value - CLIP_MEAN[c]) / CLIP_STD[c]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_landscape_is_center_cropped() {
        let image = RgbImage::from_fn(400, 200, |x, _| {
            if x < 100 || x >= 300 { Rgb([255, 0, 0]) } else { Rgb([0, 255, 0]) }
        });
        let cropped = resize_and_crop(&image, 100).unwrap();
        assert_eq!(cropped.dimensions(), (100, 100));
        // 中央は緑
        let center = cropped.get_pixel(50, 50);
        assert!(center[1] > 250 && center[0] < 5, "{:?}", center);
    }

    #[test]
    fn test_small_image_is_upscaled() {
        let image = RgbImage::from_pixel(10, 30, Rgb([10, 20, 30]));
        let cropped = resize_and_crop(&image, 224).unwrap();
        assert_eq!(cropped.dimensions(), (224, 224));
    }

    #[test]
    fn test_tensor_shape_and_normalization() {
        let image = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
        let tensor = preprocess(&image, 16).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 16, 16]);

        for c in 0..3 {
            let expected = (1.0 - CLIP_MEAN[c]) / CLIP_STD[c];
            assert!((tensor[[0, c, 8, 8]] - expected).abs() < 0.02);
        }
    }

    #[test]
    fn test_empty_image_rejected() {
        let image = RgbImage::new(0, 0);
        assert!(preprocess(&image, 16).is_err());
    }
}
