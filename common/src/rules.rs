//! 類似度スコアの重大度バンド判定
//!
//! バンド表（上から順に評価、最初に一致したものを採用）:
//! - 85以上: 損傷なし
//! - 70以上: 軽微な差異（画像処理の問題は先頭2件まで）
//! - 50以上: 中程度の差異（全件）
//! - それ未満: 重大な不一致（全件、なければ定型文）

use serde::{Deserialize, Serialize};

/// 画像処理で問題が見つかった場合の信頼度上限
pub const VISUAL_ISSUE_CONFIDENCE_CAP: f64 = 0.90;

/// 重大な不一致で画像処理の問題がなかった場合の定型文
pub const NO_MATCH_FALLBACK: &str = "Item does not match reference image";

/// 判定ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLabel {
    NoDamage,
    MinorDifference,
    ModerateDifference,
    MajorMismatch,
    Error,
}

impl IssueLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueLabel::NoDamage => "no_damage",
            IssueLabel::MinorDifference => "minor_difference",
            IssueLabel::ModerateDifference => "moderate_difference",
            IssueLabel::MajorMismatch => "major_mismatch",
            IssueLabel::Error => "error",
        }
    }
}

impl std::fmt::Display for IssueLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// バンドに含める画像処理の問題
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualIssuePolicy {
    /// 含めない
    None,
    /// 先頭n件まで
    First(usize),
    /// すべて
    All,
    /// すべて。1件もなければ定型文
    AllOrFallback(&'static str),
}

impl VisualIssuePolicy {
    fn apply(&self, visual_issues: &[String]) -> Vec<String> {
        match *self {
            VisualIssuePolicy::None => Vec::new(),
            VisualIssuePolicy::First(n) => visual_issues.iter().take(n).cloned().collect(),
            VisualIssuePolicy::All => visual_issues.to_vec(),
            VisualIssuePolicy::AllOrFallback(fallback) => {
                if visual_issues.is_empty() {
                    vec![fallback.to_string()]
                } else {
                    visual_issues.to_vec()
                }
            }
        }
    }
}

/// 重大度バンド
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityBand {
    /// 下限（以上）
    pub min_score: f64,
    pub message: &'static str,
    pub label: IssueLabel,
    pub base_confidence: f64,
    pub visual_issues: VisualIssuePolicy,
}

/// バンド表（下限の降順、最後は必ず一致）
pub static SEVERITY_BANDS: [SeverityBand; 4] = [
    SeverityBand {
        min_score: 85.0,
        message: "Item returned successfully – no damages detected.",
        label: IssueLabel::NoDamage,
        base_confidence: 0.95,
        visual_issues: VisualIssuePolicy::None,
    },
    SeverityBand {
        min_score: 70.0,
        message: "Minor differences detected – item appears acceptable.",
        label: IssueLabel::MinorDifference,
        base_confidence: 0.85,
        visual_issues: VisualIssuePolicy::First(2),
    },
    SeverityBand {
        min_score: 50.0,
        message: "Moderate differences detected – manual review recommended.",
        label: IssueLabel::ModerateDifference,
        base_confidence: 0.75,
        visual_issues: VisualIssuePolicy::All,
    },
    SeverityBand {
        min_score: f64::NEG_INFINITY,
        message: "Significant mismatch detected – possible damage or wrong item.",
        label: IssueLabel::MajorMismatch,
        base_confidence: 0.65,
        visual_issues: VisualIssuePolicy::AllOrFallback(NO_MATCH_FALLBACK),
    },
];

/// スコアに対応するバンドを取得
pub fn band_for(similarity_score: f64) -> &'static SeverityBand {
    SEVERITY_BANDS
        .iter()
        .find(|band| similarity_score >= band.min_score)
        // NaNはどの下限も満たさないため最下位バンド扱い
        .unwrap_or(&SEVERITY_BANDS[SEVERITY_BANDS.len() - 1])
}

/// 問題文とラベルを生成
pub fn detect_issues(similarity_score: f64, visual_issues: &[String]) -> (Vec<String>, Vec<IssueLabel>) {
    let band = band_for(similarity_score);

    let mut issues = vec![band.message.to_string()];
    issues.extend(band.visual_issues.apply(visual_issues));

    (issues, vec![band.label])
}

/// 信頼度を算出
pub fn compute_confidence(similarity_score: f64, visual_issue_count: usize) -> f64 {
    let base = band_for(similarity_score).base_confidence;

    if visual_issue_count > 0 {
        base.min(VISUAL_ISSUE_CONFIDENCE_CAP)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visual(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("issue {}", i)).collect()
    }

    #[test]
    fn test_band_table_is_ordered() {
        for pair in SEVERITY_BANDS.windows(2) {
            assert!(pair[0].min_score > pair[1].min_score);
            assert!(pair[0].base_confidence > pair[1].base_confidence);
        }
    }

    #[test]
    fn test_band_boundaries() {
        let cases = [
            (100.0, IssueLabel::NoDamage),
            (85.0, IssueLabel::NoDamage),
            (84.99, IssueLabel::MinorDifference),
            (70.0, IssueLabel::MinorDifference),
            (69.99, IssueLabel::ModerateDifference),
            (50.0, IssueLabel::ModerateDifference),
            (49.99, IssueLabel::MajorMismatch),
            (0.0, IssueLabel::MajorMismatch),
            (f64::NAN, IssueLabel::MajorMismatch),
        ];
        for (score, label) in cases {
            assert_eq!(band_for(score).label, label, "score {}", score);
        }
    }

    #[test]
    fn test_no_damage_ignores_visual_issues() {
        let (issues, labels) = detect_issues(92.0, &visual(3));
        assert_eq!(issues, vec!["Item returned successfully – no damages detected.".to_string()]);
        assert_eq!(labels, vec![IssueLabel::NoDamage]);
    }

    #[test]
    fn test_minor_takes_first_two() {
        let (issues, labels) = detect_issues(75.0, &visual(3));
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[1], "issue 1");
        assert_eq!(issues[2], "issue 2");
        assert_eq!(labels, vec![IssueLabel::MinorDifference]);

        let (issues, _) = detect_issues(75.0, &[]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_moderate_takes_all() {
        let (issues, labels) = detect_issues(60.0, &visual(4));
        assert_eq!(issues.len(), 5);
        assert_eq!(labels, vec![IssueLabel::ModerateDifference]);
    }

    #[test]
    fn test_major_fallback() {
        let (issues, labels) = detect_issues(30.0, &[]);
        assert_eq!(
            issues,
            vec![
                "Significant mismatch detected – possible damage or wrong item.".to_string(),
                NO_MATCH_FALLBACK.to_string(),
            ]
        );
        assert_eq!(labels, vec![IssueLabel::MajorMismatch]);

        let (issues, _) = detect_issues(30.0, &visual(2));
        assert_eq!(issues.len(), 3);
        assert!(!issues.contains(&NO_MATCH_FALLBACK.to_string()));
    }

    #[test]
    fn test_label_monotonic_in_score() {
        let issues = visual(2);
        let mut prev = detect_issues(0.0, &issues).1[0];
        for step in 1..=1000 {
            let score = step as f64 * 0.1;
            let label = detect_issues(score, &issues).1[0];
            // ラベルの並びは良い順
            assert!(label <= prev, "score {} label {:?} prev {:?}", score, label, prev);
            prev = label;
        }
    }

    #[test]
    fn test_confidence_by_band() {
        assert_eq!(compute_confidence(90.0, 0), 0.95);
        assert_eq!(compute_confidence(80.0, 0), 0.85);
        assert_eq!(compute_confidence(60.0, 0), 0.75);
        assert_eq!(compute_confidence(10.0, 0), 0.65);
    }

    #[test]
    fn test_confidence_capped_with_visual_issues() {
        assert_eq!(compute_confidence(90.0, 1), 0.90);
        // 上限より低いものは変わらない
        assert_eq!(compute_confidence(80.0, 3), 0.85);
        assert_eq!(compute_confidence(10.0, 5), 0.65);
    }

    #[test]
    fn test_confidence_non_increasing_in_issue_count() {
        for score in [95.0, 77.0, 55.0, 20.0] {
            let mut prev = compute_confidence(score, 0);
            for count in 1..6 {
                let c = compute_confidence(score, count);
                assert!(c <= prev);
                assert!((0.0..=1.0).contains(&c));
                prev = c;
            }
        }
    }

    #[test]
    fn test_label_serialization() {
        let json = serde_json::to_string(&vec![IssueLabel::NoDamage, IssueLabel::Error]).unwrap();
        assert_eq!(json, r#"["no_damage","error"]"#);
        assert_eq!(IssueLabel::MajorMismatch.to_string(), "major_mismatch");
    }
}
