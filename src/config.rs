use crate::error::{ReturnAiError, Result};
use return_ai_common::DEFAULT_MODEL_VERSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// モデルパスを上書きする環境変数
pub const MODEL_PATH_ENV: &str = "RETURN_AI_MODEL_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CLIP画像エンコーダのONNXファイル
    pub model_path: Option<PathBuf>,
    /// 出力JSONに記録するモデルバージョン
    pub model_version: String,
    /// モデル入力の一辺（px）
    pub input_size: u32,
    /// 埋め込みとして使う出力のインデックス
    pub embedding_output: usize,
    /// stderrへのログレベル (error/warn/info/debug/trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            model_version: DEFAULT_MODEL_VERSION.into(),
            input_size: 224, // CLIP ViT-B/32
            embedding_output: 0,
            log_level: "warn".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;

        // 環境変数を優先
        if let Ok(path) = std::env::var(MODEL_PATH_ENV) {
            if !path.is_empty() {
                config.model_path = Some(PathBuf::from(path));
            }
        }

        Ok(config)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            ReturnAiError::Config(format!("{}: {}", config_path.display(), e))
        })?;

        if config.input_size == 0 {
            return Err(ReturnAiError::Config("input_size must be positive".into()));
        }

        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReturnAiError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("return-ai").join("config.json"))
    }

    /// 設定済みのモデルパスを取得
    pub fn model_path(&self) -> Result<&Path> {
        let path = self.model_path.as_deref().ok_or_else(|| {
            ReturnAiError::MissingDependency(format!(
                "CLIP model path not configured (set {} or model_path in config)",
                MODEL_PATH_ENV
            ))
        })?;

        if !path.exists() {
            return Err(ReturnAiError::MissingDependency(format!(
                "CLIP model file not found: {}",
                path.display()
            )));
        }

        Ok(path)
    }
}
