//! 画像処理による差異解析
//!
//! 失敗しても比較全体は止めない:
//! - どちらかが読めない → 問題なし・メトリクス空
//! - 解析中のエラー/パニック → 問題リスト1件とエラーマーカー

mod features;
mod metrics;

pub use features::{match_features, FeatureMatch, MAX_KEYPOINTS};

use crate::error::{ReturnAiError, Result};
use crate::loader::{load_raster, ImagePair};
use image::imageops::{self, FilterType};
use image::DynamicImage;
use return_ai_common::{Measurements, VisualAnalysis};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// ファイルから解析
pub fn analyze_visual_differences(pair: &ImagePair) -> VisualAnalysis {
    let reference = load_raster(&pair.reference);
    let returned = load_raster(&pair.returned);

    match (reference, returned) {
        (Ok(reference), Ok(returned)) => analyze_images(&reference, &returned),
        (reference, returned) => {
            for err in [reference.err(), returned.err()].into_iter().flatten() {
                tracing::warn!("画像処理解析をスキップ: {}", err);
            }
            VisualAnalysis::empty()
        }
    }
}

/// デコード済み画像から解析
pub fn analyze_images(reference: &DynamicImage, returned: &DynamicImage) -> VisualAnalysis {
    match panic::catch_unwind(AssertUnwindSafe(|| measure(reference, returned))) {
        Ok(Ok(measurements)) => {
            tracing::debug!("画像処理メトリクス: {:?}", measurements);
            VisualAnalysis::from_measurements(&measurements)
        }
        Ok(Err(err)) => {
            tracing::warn!("画像処理解析エラー: {}", err);
            VisualAnalysis::failed(err.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!("画像処理解析でパニック: {}", message);
            VisualAnalysis::failed(message)
        }
    }
}

/// 共通解像度（小さい方の幅・高さ）に揃えて各メトリクスを計測
pub fn measure(reference: &DynamicImage, returned: &DynamicImage) -> Result<Measurements> {
    let width = reference.width().min(returned.width());
    let height = reference.height().min(returned.height());
    if width == 0 || height == 0 {
        return Err(ReturnAiError::ImageLoad(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }

    let reference = imageops::resize(&reference.to_rgb8(), width, height, FilterType::Triangle);
    let returned = imageops::resize(&returned.to_rgb8(), width, height, FilterType::Triangle);
    let gray_reference = imageops::grayscale(&reference);
    let gray_return = imageops::grayscale(&returned);

    let features = match_features(&gray_reference, &gray_return)
        .map_err(ReturnAiError::ImageLoad)?;

    Ok(Measurements {
        histogram_correlation: metrics::histogram_correlation(&reference, &returned),
        brightness_reference: metrics::mean_brightness(&gray_reference),
        brightness_return: metrics::mean_brightness(&gray_return),
        edge_difference: metrics::edge_difference(&gray_reference, &gray_return),
        keypoints_reference: features.keypoints_reference,
        keypoints_return: features.keypoints_return,
        matched_pairs: features.matched_pairs,
        sharpness_reference: metrics::laplacian_variance(&gray_reference),
        sharpness_return: metrics::laplacian_variance(&gray_return),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
