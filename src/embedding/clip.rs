//! CLIP画像エンコーダ（ONNX / tract）

use super::preprocess::preprocess;
use super::Embedder;
use crate::config::Config;
use crate::error::{ReturnAiError, Result};
use image::RgbImage;
use std::path::Path;
use tract_onnx::prelude::*;

type ClipPlan = TypedRunnableModel<TypedModel>;

pub struct ClipEmbedder {
    model: ClipPlan,
    input_size: u32,
    output_index: usize,
}

impl ClipEmbedder {
    /// 設定からモデルを読み込む
    pub fn from_config(config: &Config) -> Result<Self> {
        let path = config.model_path()?;
        Self::load(path, config.input_size, config.embedding_output)
    }

    pub fn load(path: &Path, input_size: u32, output_index: usize) -> Result<Self> {
        tracing::info!("モデル読み込み中: {}", path.display());

        let model = build_plan(path, input_size)
            .map_err(|e| ReturnAiError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        tracing::info!("モデル読み込み完了 (入力 {}px)", input_size);

        Ok(Self {
            model,
            input_size,
            output_index,
        })
    }
}

fn build_plan(path: &Path, input_size: u32) -> TractResult<ClipPlan> {
    let side = input_size as usize;

    tract_onnx::onnx()
        .model_for_path(path)?
        .with_input_fact(0, f32::fact([1, 3, side, side]).into())?
        .into_optimized()?
        .into_runnable()
}

impl Embedder for ClipEmbedder {
    fn embed(&self, image: &RgbImage) -> anyhow::Result<Vec<f32>> {
        let input: Tensor = preprocess(image, self.input_size)?.into();
        let outputs = self.model.run(tvec!(input.into()))?;

        let output = outputs.get(self.output_index).ok_or_else(|| {
            anyhow::anyhow!(
                "model has {} outputs, embedding output #{} requested",
                outputs.len(),
                self.output_index
            )
        })?;

        let embedding: Vec<f32> = output.to_array_view::<f32>()?.iter().copied().collect();
        tracing::debug!("埋め込み次元: {}", embedding.len());

        Ok(embedding)
    }
}
