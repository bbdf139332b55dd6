mod exif;

use crate::error::{ReturnAiError, Result};
use image::metadata::Orientation;
use image::{DynamicImage, ImageReader, RgbImage};
use std::path::{Path, PathBuf};

/// 比較対象の2枚
#[derive(Debug, Clone)]
pub struct ImagePair {
    pub reference: PathBuf,
    pub returned: PathBuf,
}

impl ImagePair {
    pub fn new(reference: impl Into<PathBuf>, returned: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            returned: returned.into(),
        }
    }

    /// 両ファイルの存在確認（参照 → 返却の順）
    pub fn validate(&self) -> Result<()> {
        if !self.reference.exists() {
            return Err(ReturnAiError::ReferenceNotFound(
                self.reference.display().to_string(),
            ));
        }
        if !self.returned.exists() {
            return Err(ReturnAiError::ReturnNotFound(
                self.returned.display().to_string(),
            ));
        }
        Ok(())
    }
}

/// 画像を読み込み、EXIFの向きを適用
pub fn load_raster(path: &Path) -> Result<DynamicImage> {
    let mut image = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| ReturnAiError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| ReturnAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    // EXIFが無い・読めない場合はそのまま
    if let Some(orientation) = exif::extract_orientation(path)
        .ok()
        .and_then(Orientation::from_exif)
    {
        image.apply_orientation(orientation);
    }

    Ok(image)
}

/// RGB 3チャンネルで読み込み
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    Ok(load_raster(path)?.to_rgb8())
}
