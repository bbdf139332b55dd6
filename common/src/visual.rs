//! 画像処理メトリクスの閾値判定（CLI/テスト共通）
//!
//! 計測値（Measurements）から、
//! - 問題文字列のリスト（判定順は固定）
//! - 丸め済みメトリクスのスナップショット（VisualMetrics）
//! を生成する。計測そのものは本体クレート側で行う。

use crate::similarity::round_to;
use serde::{Deserialize, Serialize};

// ヒストグラム相関
pub const HISTOGRAM_MAJOR_BELOW: f64 = 0.4;
pub const HISTOGRAM_NOTICEABLE_BELOW: f64 = 0.75;

// 明るさ差（0〜255）
pub const BRIGHTNESS_SEVERE_ABOVE: f64 = 60.0;
pub const BRIGHTNESS_MODERATE_ABOVE: f64 = 30.0;

// エッジ差（画素あたり平均、0〜255）
pub const EDGE_GREAT_ABOVE: f64 = 35.0;
pub const EDGE_NOTICEABLE_ABOVE: f64 = 20.0;

// 特徴点マッチ率
pub const MATCH_MIN_KEYPOINTS: usize = 50;
pub const MATCH_VERY_LOW_BELOW: f64 = 0.1;
pub const MATCH_LOW_BELOW: f64 = 0.25;

// ラプラシアン分散（ぼけ判定）
pub const BLUR_RETURN_BELOW: f64 = 20.0;
pub const BLUR_REFERENCE_FACTOR: f64 = 2.0;

pub const ISSUE_COLOR_MAJOR: &str = "Major color and texture mismatch detected";
pub const ISSUE_COLOR_NOTICEABLE: &str = "Noticeable color differences observed";
pub const ISSUE_LIGHTING_SEVERE: &str =
    "Severe lighting difference detected between reference and return images";
pub const ISSUE_LIGHTING_MODERATE: &str = "Moderate lighting difference detected";
pub const ISSUE_EDGES_GREAT: &str =
    "Structural outline differs greatly – possible different item returned";
pub const ISSUE_EDGES_NOTICEABLE: &str = "Surface patterns and edges differ noticeably";
pub const ISSUE_FEATURES_VERY_LOW: &str =
    "Object features do not match the reference item (very low feature alignment)";
pub const ISSUE_FEATURES_LOW: &str =
    "Low feature alignment detected – item may differ from reference";
pub const ISSUE_BLURRY_RETURN: &str =
    "Return photo appears blurry – surface details not clearly visible";

/// 1回の比較で得られた生の計測値（丸め前）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    pub histogram_correlation: f64,
    pub brightness_reference: f64,
    pub brightness_return: f64,
    pub edge_difference: f64,
    pub keypoints_reference: usize,
    pub keypoints_return: usize,
    /// 相互最近傍マッチ数。どちらかに記述子がなくマッチングを行わなかった場合は None
    pub matched_pairs: Option<usize>,
    pub sharpness_reference: f64,
    pub sharpness_return: f64,
}

impl Measurements {
    pub fn brightness_difference(&self) -> f64 {
        (self.brightness_reference - self.brightness_return).abs()
    }

    /// マッチ率の分母。マッチングを行わなかった場合は None
    pub fn match_basis(&self) -> Option<usize> {
        self.matched_pairs?;
        Some(self.keypoints_reference.min(self.keypoints_return))
    }

    pub fn feature_match_ratio(&self) -> f64 {
        match (self.matched_pairs, self.match_basis()) {
            (Some(matched), Some(basis)) if basis > 0 => matched as f64 / basis as f64,
            _ => 0.0,
        }
    }

    /// 閾値を超えた問題を判定順に列挙（重複除去なし）
    pub fn issues(&self) -> Vec<String> {
        [
            color_issue(self.histogram_correlation),
            lighting_issue(self.brightness_difference()),
            edge_issue(self.edge_difference),
            feature_issue(self.feature_match_ratio(), self.match_basis()),
            blur_issue(self.sharpness_reference, self.sharpness_return),
        ]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect()
    }

    /// 出力用スナップショット
    pub fn snapshot(&self) -> VisualMetrics {
        VisualMetrics {
            histogram_correlation: Some(round_to(self.histogram_correlation, 3)),
            brightness_difference: Some(round_to(self.brightness_difference(), 2)),
            brightness_reference: Some(round_to(self.brightness_reference, 2)),
            brightness_return: Some(round_to(self.brightness_return, 2)),
            edge_difference: Some(round_to(self.edge_difference, 2)),
            keypoints_reference: Some(self.keypoints_reference),
            keypoints_return: Some(self.keypoints_return),
            feature_match_ratio: Some(round_to(self.feature_match_ratio(), 3)),
            sharpness_reference: Some(round_to(self.sharpness_reference, 2)),
            sharpness_return: Some(round_to(self.sharpness_return, 2)),
            error: None,
        }
    }
}

pub fn color_issue(correlation: f64) -> Option<&'static str> {
    if correlation < HISTOGRAM_MAJOR_BELOW {
        Some(ISSUE_COLOR_MAJOR)
    } else if correlation < HISTOGRAM_NOTICEABLE_BELOW {
        Some(ISSUE_COLOR_NOTICEABLE)
    } else {
        None
    }
}

pub fn lighting_issue(difference: f64) -> Option<&'static str> {
    if difference > BRIGHTNESS_SEVERE_ABOVE {
        Some(ISSUE_LIGHTING_SEVERE)
    } else if difference > BRIGHTNESS_MODERATE_ABOVE {
        Some(ISSUE_LIGHTING_MODERATE)
    } else {
        None
    }
}

pub fn edge_issue(difference: f64) -> Option<&'static str> {
    if difference > EDGE_GREAT_ABOVE {
        Some(ISSUE_EDGES_GREAT)
    } else if difference > EDGE_NOTICEABLE_ABOVE {
        Some(ISSUE_EDGES_NOTICEABLE)
    } else {
        None
    }
}

/// 特徴点マッチ率の判定
///
/// `basis` が None（マッチング未実施）の場合は判定自体を行わない。
/// 特徴点ゼロを「不一致」とは扱わない。
pub fn feature_issue(ratio: f64, basis: Option<usize>) -> Option<&'static str> {
    let basis = basis?;
    if basis <= MATCH_MIN_KEYPOINTS {
        return None;
    }

    if ratio < MATCH_VERY_LOW_BELOW {
        Some(ISSUE_FEATURES_VERY_LOW)
    } else if ratio < MATCH_LOW_BELOW {
        Some(ISSUE_FEATURES_LOW)
    } else {
        None
    }
}

pub fn blur_issue(sharpness_reference: f64, sharpness_return: f64) -> Option<&'static str> {
    if sharpness_return < BLUR_RETURN_BELOW
        && sharpness_reference > sharpness_return * BLUR_REFERENCE_FACTOR
    {
        Some(ISSUE_BLURRY_RETURN)
    } else {
        None
    }
}

/// 出力用メトリクス（キーが無いものは出力しない）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram_correlation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_difference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_reference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_difference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypoints_reference: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypoints_return: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_match_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness_reference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness_return: Option<f64>,
    /// 解析失敗時のみ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VisualMetrics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 画像処理ステージの結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualAnalysis {
    pub issues: Vec<String>,
    pub metrics: VisualMetrics,
}

impl VisualAnalysis {
    /// 画像が読めなかった場合（追加シグナルなし）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 解析中の失敗を問題リストに吸収する
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            issues: vec![format!("Visual analysis error: {}", message)],
            metrics: VisualMetrics {
                error: Some(message),
                ..Default::default()
            },
        }
    }

    pub fn from_measurements(measurements: &Measurements) -> Self {
        Self {
            issues: measurements.issues(),
            metrics: measurements.snapshot(),
        }
    }
}
