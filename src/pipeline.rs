//! 比較処理の本体
//!
//! 類似度 → 画像処理解析 → 問題・ラベル・信頼度の順に1回だけ実行する。

use crate::embedding::{compute_similarity, Embedder};
use crate::error::Result;
use crate::loader::ImagePair;
use crate::visual::analyze_visual_differences;
use return_ai_common::ComparisonResult;

pub fn compare(embedder: &dyn Embedder, pair: &ImagePair, model_version: &str) -> Result<ComparisonResult> {
    pair.validate()?;

    tracing::info!("[1/2] 類似度計算中...");
    let similarity = compute_similarity(embedder, pair)?;
    tracing::info!("✔ 類似度 {:.2}", similarity);

    tracing::info!("[2/2] 画像処理解析中...");
    let visual = analyze_visual_differences(pair);
    tracing::info!("✔ 検出 {}件", visual.issues.len());

    Ok(ComparisonResult::assemble(similarity, visual, model_version))
}
