mod clip;
mod preprocess;

pub use clip::ClipEmbedder;

use crate::error::{ReturnAiError, Result};
use crate::loader::{load_rgb, ImagePair};
use image::RgbImage;
use return_ai_common::{cosine_similarity, similarity_score};
use std::path::Path;

/// 画像 → 固定長ベクトル
///
/// 1枚につき1回呼ばれる。実装はモデルごとの前処理も含む。
pub trait Embedder {
    fn embed(&self, image: &RgbImage) -> anyhow::Result<Vec<f32>>;
}

/// 2枚の意味的類似度（0〜100）
pub fn compute_similarity(embedder: &dyn Embedder, pair: &ImagePair) -> Result<f64> {
    let reference = embed_file(embedder, &pair.reference)?;
    let returned = embed_file(embedder, &pair.returned)?;

    let cosine = cosine_similarity(&reference, &returned)
        .map_err(|e| ReturnAiError::SimilarityCompute(e.to_string()))?;
    let score = similarity_score(cosine);

    tracing::debug!("コサイン類似度: {:.4} → スコア {:.2}", cosine, score);
    Ok(score)
}

fn embed_file(embedder: &dyn Embedder, path: &Path) -> Result<Vec<f32>> {
    let image = load_rgb(path)
        .map_err(|e| ReturnAiError::SimilarityCompute(e.to_string()))?;

    embedder
        .embed(&image)
        .map_err(|e| ReturnAiError::SimilarityCompute(format!("{}: {}", path.display(), e)))
}
