//! 出力JSONの型定義
//!
//! - ComparisonResult: 成功時の出力
//! - ErrorEnvelope: 失敗時の出力（どの失敗でも同じ形でパースできる）

use crate::error::Result;
use crate::rules::{compute_confidence, detect_issues, IssueLabel};
use crate::similarity::round_to;
use crate::visual::{VisualAnalysis, VisualMetrics};
use serde::{Deserialize, Serialize};

/// 既定のモデルバージョンタグ
pub const DEFAULT_MODEL_VERSION: &str = "clip-vit-base-patch32-v1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// 比較結果（成功時）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub ai_similarity_score: Option<f64>,
    pub ai_confidence: f64,
    pub ai_detected_issues: Vec<String>,
    pub ai_issue_labels: Vec<IssueLabel>,
    /// 画像処理で検出された問題（バンドによる切り詰め前）
    pub visual_analysis: Vec<String>,
    #[serde(default)]
    pub visual_metrics: VisualMetrics,
    pub model_version: String,
    pub status: Status,
}

impl ComparisonResult {
    /// 類似度スコアと画像処理結果から最終結果を組み立てる
    pub fn assemble(similarity_score: f64, visual: VisualAnalysis, model_version: &str) -> Self {
        let (issues, labels) = detect_issues(similarity_score, &visual.issues);
        let confidence = compute_confidence(similarity_score, visual.issues.len());

        Self {
            ai_similarity_score: Some(round_to(similarity_score, 2)),
            ai_confidence: round_to(confidence, 2),
            ai_detected_issues: issues,
            ai_issue_labels: labels,
            visual_analysis: visual.issues,
            visual_metrics: visual.metrics,
            model_version: model_version.to_string(),
            status: Status::Success,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        to_json(self, pretty)
    }
}

/// 失敗時の出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub ai_similarity_score: Option<f64>,
    pub ai_confidence: f64,
    pub ai_detected_issues: Vec<String>,
    pub ai_issue_labels: Vec<IssueLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ErrorEnvelope {
    /// 入力検証系の失敗（ラベル・ステータスなし）
    pub fn rejected(error: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ai_similarity_score: None,
            ai_confidence: 0.0,
            ai_detected_issues: vec![issue.into()],
            ai_issue_labels: Vec::new(),
            status: None,
        }
    }

    /// 推論中の失敗
    pub fn inference_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            ai_detected_issues: vec![format!("AI inference failed: {}", message)],
            error: message,
            ai_similarity_score: None,
            ai_confidence: 0.0,
            ai_issue_labels: vec![IssueLabel::Error],
            status: Some(Status::Failed),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        to_json(self, pretty)
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
