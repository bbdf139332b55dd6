//! 画素単位のメトリクス（色・明るさ・エッジ・鮮鋭度）

use image::{GrayImage, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::laplacian_filter;

/// 1チャンネルあたりのビン数
pub const HISTOGRAM_BINS: usize = 16;
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// RGB 3次元ヒストグラム（L2正規化済み、長さ 16^3）
pub fn color_histogram(image: &RgbImage) -> Vec<f64> {
    let bin_width = 256 / HISTOGRAM_BINS;
    let mut histogram = vec![0.0; HISTOGRAM_BINS.pow(3)];

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0.map(|v| v as usize / bin_width);
        histogram[(r * HISTOGRAM_BINS + g) * HISTOGRAM_BINS + b] += 1.0;
    }

    let norm = histogram.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        histogram.iter_mut().for_each(|v| *v /= norm);
    }
    histogram
}

/// ヒストグラム相関（ピアソン）。分散がなければ 1.0
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len()) as f64;
    if n == 0.0 {
        return 1.0;
    }

    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut num, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (da, db) = (x - mean_a, y - mean_b);
        num += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = var_a * var_b;
    if denom.abs() > f64::EPSILON {
        num / denom.sqrt()
    } else {
        1.0
    }
}

pub fn histogram_correlation(reference: &RgbImage, returned: &RgbImage) -> f64 {
    correlation(&color_histogram(reference), &color_histogram(returned))
}

/// 平均輝度（0〜255）
pub fn mean_brightness(gray: &GrayImage) -> f64 {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    pixels.iter().map(|&p| p as f64).sum::<f64>() / pixels.len() as f64
}

/// Cannyエッジ画像の画素あたり平均絶対差（同サイズ前提）
pub fn edge_difference(reference: &GrayImage, returned: &GrayImage) -> f64 {
    let edges_reference = canny(reference, CANNY_LOW, CANNY_HIGH);
    let edges_return = canny(returned, CANNY_LOW, CANNY_HIGH);

    let pixel_count = edges_reference.as_raw().len();
    if pixel_count == 0 {
        return 0.0;
    }

    let total: f64 = edges_reference
        .as_raw()
        .iter()
        .zip(edges_return.as_raw())
        .map(|(&a, &b)| (a as f64 - b as f64).abs())
        .sum();

    total / pixel_count as f64
}

/// ラプラシアンの分散（小さいほどぼけている）
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let laplacian = laplacian_filter(gray);
    let values = laplacian.as_raw();
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n
}
