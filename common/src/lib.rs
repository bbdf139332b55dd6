//! Return AI Common Library
//!
//! 判定ロジック（バンド表・信頼度・画像処理メトリクスの閾値）と出力型。
//! I/Oを持たないため、固定の埋め込みや計測値で決定的にテストできる。

pub mod error;
pub mod rules;
pub mod similarity;
pub mod types;
pub mod visual;

pub use error::{Error, Result};
pub use rules::{band_for, compute_confidence, detect_issues, IssueLabel, SeverityBand, SEVERITY_BANDS};
pub use similarity::{cosine_similarity, round_to, similarity_score};
pub use types::{ComparisonResult, ErrorEnvelope, Status, DEFAULT_MODEL_VERSION};
pub use visual::{Measurements, VisualAnalysis, VisualMetrics};
