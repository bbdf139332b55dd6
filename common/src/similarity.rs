//! 埋め込みベクトルの類似度計算
//!
//! 埋め込み → L2正規化 → コサイン類似度 → 0〜100スコア

use crate::error::{Error, Result};

/// L2正規化（f64で計算）
pub fn l2_normalize(vector: &[f32]) -> Result<Vec<f64>> {
    if vector.is_empty() {
        return Err(Error::InvalidEmbedding("empty embedding".into()));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidEmbedding("embedding contains non-finite values".into()));
    }

    let norm = vector
        .iter()
        .map(|&v| (v as f64) * (v as f64))
        .sum::<f64>()
        .sqrt();

    if norm == 0.0 {
        return Err(Error::InvalidEmbedding("embedding has zero norm".into()));
    }

    Ok(vector.iter().map(|&v| v as f64 / norm).collect())
}

/// 正規化済みベクトルのコサイン類似度 [-1, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::InvalidEmbedding(format!(
            "embedding length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let a = l2_normalize(a)?;
    let b = l2_normalize(b)?;
    let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();

    // 丸め誤差で範囲外に出ないように
    Ok(dot.clamp(-1.0, 1.0))
}

/// コサイン類似度 [-1, 1] を 0〜100 のスコアへ線形変換
pub fn similarity_score(cosine: f64) -> f64 {
    ((cosine + 1.0) / 2.0) * 100.0
}

/// 小数点以下 `places` 桁で丸める
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
