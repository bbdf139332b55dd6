//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングとJSON化を検証

use return_ai_common::{ErrorEnvelope, IssueLabel, Status};
use return_ai_rust::error::ReturnAiError;
use return_ai_rust::loader::ImagePair;
use tempfile::tempdir;

/// 存在しない参照画像
#[test]
fn test_reference_not_found() {
    let pair = ImagePair::new("/nonexistent/path/ref.jpg", "/nonexistent/path/ret.jpg");
    let err = pair.validate().unwrap_err();

    assert!(matches!(err, ReturnAiError::ReferenceNotFound(_)));
    let env = ErrorEnvelope::from(&err);
    assert_eq!(env.error, "Reference image not found: /nonexistent/path/ref.jpg");
    assert_eq!(env.ai_similarity_score, None);
    assert_eq!(env.ai_confidence, 0.0);
}

/// 返却画像のみ存在しない
#[test]
fn test_return_not_found() {
    let dir = tempdir().expect("Failed to create temp dir");
    let reference = dir.path().join("ref.jpg");
    std::fs::write(&reference, "dummy").unwrap();

    let pair = ImagePair::new(&reference, dir.path().join("ret.jpg"));
    let err = pair.validate().unwrap_err();
    assert!(matches!(err, ReturnAiError::ReturnNotFound(_)));
    assert_eq!(ErrorEnvelope::from(&err).ai_detected_issues, vec!["Return image not found".to_string()]);
}

/// ReturnAiErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ReturnAiError::InvalidArguments,
        ReturnAiError::MissingDependency("onnx".to_string()),
        ReturnAiError::ReferenceNotFound("a.jpg".to_string()),
        ReturnAiError::ReturnNotFound("b.jpg".to_string()),
        ReturnAiError::Config("broken".to_string()),
        ReturnAiError::ModelLoad("bad graph".to_string()),
        ReturnAiError::SimilarityCompute("nan".to_string()),
        ReturnAiError::ImageLoad("decode".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 推論系エラーはstatus=failedとerrorラベル
#[test]
fn test_inference_failure_envelope() {
    let err = ReturnAiError::ModelLoad("unsupported operator".to_string());
    let env = ErrorEnvelope::from(&err);

    assert_eq!(env.status, Some(Status::Failed));
    assert_eq!(env.ai_issue_labels, vec![IssueLabel::Error]);
    assert_eq!(
        env.ai_detected_issues,
        vec!["AI inference failed: Failed to load CLIP model: unsupported operator".to_string()]
    );
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ReturnAiError = io_err.into();

    assert!(matches!(err, ReturnAiError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーはcommon経由で変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ReturnAiError = return_ai_common::Error::from(json_err).into();

    assert!(matches!(err, ReturnAiError::Common(return_ai_common::Error::Json(_))));
    assert!(ErrorEnvelope::from(&err).ai_detected_issues[0].starts_with("AI inference failed: "));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = return_ai_common::Error::InvalidEmbedding("zero norm".to_string());
    let err: ReturnAiError = common_err.into();

    assert!(matches!(err, ReturnAiError::Common(_)));
    assert_eq!(format!("{}", err), "Invalid embedding: zero norm");
}
